use serde::Serialize;

use crate::{error::Error, types::ApiBank};

pub const UNKNOWN_BANK: &str = "Банк не выбран";
pub const OTHER_BANKS: &str = "Другие банки";
pub const UNKNOWN_RATE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankMeta {
    pub id: i64,
    pub code: &'static str,
    pub name: &'static str,
    pub rate: &'static str,
    pub perk: Option<&'static str>,
}

/// Rates and perks are not served by the backend.
pub const BANK_TABLE: [BankMeta; 5] = [
    BankMeta {
        id: 1,
        code: "ALFA",
        name: "Альфа-Банк",
        rate: "25% годовых",
        perk: None,
    },
    BankMeta {
        id: 2,
        code: "VTB",
        name: "ВТБ",
        rate: "13% годовых",
        perk: Some("20 дней без %"),
    },
    BankMeta {
        id: 3,
        code: "SBER",
        name: "Сбербанк",
        rate: "18% годовых",
        perk: Some("10 дней без %"),
    },
    BankMeta {
        id: 4,
        code: "TBANK",
        name: "Т-Банк",
        rate: "10% годовых",
        perk: Some("Мгновенное решение"),
    },
    BankMeta {
        id: 5,
        code: "OTP",
        name: "ОТП Банк",
        rate: "21% годовых",
        perk: None,
    },
];

pub fn meta_by_code(code: &str) -> Option<&'static BankMeta> {
    let code = code.trim().to_uppercase();
    BANK_TABLE.iter().find(|meta| meta.code == code)
}

pub fn meta_by_id(id: i64) -> Option<&'static BankMeta> {
    BANK_TABLE.iter().find(|meta| meta.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bank {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub rate: String,
    pub perk: Option<String>,
    pub logo: String,
}

impl Bank {
    pub fn decode(raw: ApiBank) -> Result<Bank, Error> {
        let id = raw
            .bank_id
            .or(raw.id)
            .and_then(|id| id.as_i64())
            .ok_or_else(|| Error::FieldNotExist(String::from("bank_id")))?;

        let code = raw
            .code
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());

        let meta = code
            .as_deref()
            .and_then(meta_by_code)
            .or_else(|| if code.is_none() { meta_by_id(id) } else { None });

        let code = code
            .or_else(|| meta.map(|m| m.code.to_owned()))
            .unwrap_or_else(|| id.to_string());

        let name = raw
            .name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| meta.map(|m| m.name.to_owned()))
            .unwrap_or_else(|| code.to_owned());

        Ok(Bank {
            id,
            logo: logo_path(&code),
            rate: meta
                .map(|m| m.rate.to_owned())
                .unwrap_or_else(|| String::from(UNKNOWN_RATE)),
            perk: meta.and_then(|m| m.perk.map(str::to_owned)),
            code,
            name,
        })
    }
}

impl From<&BankMeta> for Bank {
    fn from(meta: &BankMeta) -> Self {
        Bank {
            id: meta.id,
            code: meta.code.to_owned(),
            name: meta.name.to_owned(),
            rate: meta.rate.to_owned(),
            perk: meta.perk.map(str::to_owned),
            logo: logo_path(meta.code),
        }
    }
}

fn logo_path(code: &str) -> String {
    format!("/assets/banks/{}.svg", code.to_lowercase())
}

pub fn static_catalog() -> Vec<Bank> {
    BANK_TABLE.iter().map(Bank::from).collect()
}

/// Backend banks merged with the static table; the table alone when the
/// backend lists nothing usable.
pub fn bank_catalog(raw: Vec<ApiBank>) -> Vec<Bank> {
    let banks = super::decode_list(raw, "bank", Bank::decode);

    if banks.is_empty() {
        return static_catalog();
    }

    banks
}

pub fn bank_name(banks: &[Bank], id: Option<i64>) -> String {
    id.and_then(|id| {
        banks
            .iter()
            .find(|bank| bank.id == id)
            .map(|bank| bank.name.to_owned())
            .or_else(|| meta_by_id(id).map(|meta| meta.name.to_owned()))
    })
    .unwrap_or_else(|| String::from(UNKNOWN_BANK))
}
