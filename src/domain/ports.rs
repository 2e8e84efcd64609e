use crate::domain::model::ReturnPolicy;
use crate::utils::error::Result;

/// Blocking byte storage addressed by relative path.
pub trait Storage {
    fn exists(&self, path: &str) -> bool;
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    /// Replaces the whole file.
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn data_dir(&self) -> &str;
    fn books_file(&self) -> &str;
    fn members_file(&self) -> &str;
    fn return_policy(&self) -> ReturnPolicy;
}
