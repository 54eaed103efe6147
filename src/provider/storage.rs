use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};

use crate::error::Error;

/// String key-value persistence with local-storage semantics.
pub trait KeyValueStorage: Debug + Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// One JSON object per file. Missing file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<HashMap<String, String>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(HashMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn write(&self, values: &HashMap<String, String>) -> Result<(), Error> {
        if values.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(Error::Io(e)),
                _ => Ok(()),
            };
        }

        let data = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| Error::LockError(e.to_string()))?;
        let mut values = self.read()?;
        f(&mut values);
        self.write(&values)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| Error::LockError(e.to_string()))?;
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.update(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self
            .values
            .lock()
            .map_err(|e| Error::LockError(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| Error::LockError(e.to_string()))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| Error::LockError(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}
