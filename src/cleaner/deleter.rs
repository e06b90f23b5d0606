use std::fs;
use std::io::ErrorKind;

use crate::collection::File;
use crate::Result;

/// Removes one backup artifact, locally or on a remote store.
pub trait Deleter {
    fn delete(&self, file: &File) -> Result<()>;
}

/// Deletes from the local filesystem. A file that is already gone counts as deleted.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalDeleter;

impl Deleter for LocalDeleter {
    fn delete(&self, file: &File) -> Result<()> {
        match fs::remove_file(file.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("{} was already removed", file.path().display());
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
