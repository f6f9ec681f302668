use crate::client::{CredentialProvider, ExpenseApi};
use crate::palette::ColorTable;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub api: ExpenseApi,
    pub credentials: Arc<dyn CredentialProvider>,
    pub colors: Arc<ColorTable>,
}

impl AppState {
    pub fn new(api: ExpenseApi, credentials: Arc<dyn CredentialProvider>, colors: ColorTable) -> Self {
        Self {
            api,
            credentials,
            colors: Arc::new(colors),
        }
    }
}
