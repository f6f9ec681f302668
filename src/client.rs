use crate::models::{ExpenseRecord, NewExpense};
use reqwest::{StatusCode, Url};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::error;

pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|token| !token.is_empty()))
    }
}

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListExpenses,
    CreateExpense,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ListExpenses => f.write_str("GET /expenses"),
            Operation::CreateExpense => f.write_str("POST /expense"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{operation} returned {status}")]
    Status {
        operation: Operation,
        status: StatusCode,
    },
    #[error("{operation} failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0} was cancelled")]
    Cancelled(Operation),
    #[error("{0} task panicked")]
    Panicked(Operation),
}

impl FetchError {
    pub fn operation(&self) -> Operation {
        match self {
            FetchError::Status { operation, .. } | FetchError::Transport { operation, .. } => {
                *operation
            }
            FetchError::Cancelled(operation) | FetchError::Panicked(operation) => *operation,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.operation() {
            Operation::ListExpenses => "Failed to fetch expenses",
            Operation::CreateExpense => "Failed to save expense",
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid expense API base url: {0}")]
pub struct InvalidBaseUrl(String);

#[derive(Debug, Clone)]
pub struct ExpenseApi {
    base_url: Url,
    http: reqwest::Client,
}

impl ExpenseApi {
    pub fn new(base_url: &str) -> Result<Self, InvalidBaseUrl> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|err| InvalidBaseUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(InvalidBaseUrl(normalized));
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url
    }

    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
        creds: &dyn CredentialProvider,
    ) -> reqwest::RequestBuilder {
        match creds.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn list_expenses(
        &self,
        creds: &dyn CredentialProvider,
    ) -> Result<Vec<ExpenseRecord>, FetchError> {
        let operation = Operation::ListExpenses;
        let transport = |source| FetchError::Transport { operation, source };

        let res = self
            .authorized(self.http.get(self.endpoint("expenses")), creds)
            .send()
            .await
            .map_err(transport)?;

        if !res.status().is_success() {
            return Err(FetchError::Status {
                operation,
                status: res.status(),
            });
        }

        res.json::<Vec<ExpenseRecord>>().await.map_err(transport)
    }

    pub async fn create_expense(
        &self,
        creds: &dyn CredentialProvider,
        expense: &NewExpense,
    ) -> Result<(), FetchError> {
        let operation = Operation::CreateExpense;

        let res = self
            .authorized(self.http.post(self.endpoint("expense")), creds)
            .json(expense)
            .send()
            .await
            .map_err(|source| FetchError::Transport { operation, source })?;

        if !res.status().is_success() {
            return Err(FetchError::Status {
                operation,
                status: res.status(),
            });
        }

        Ok(())
    }

    pub fn spawn_list(
        &self,
        creds: Arc<dyn CredentialProvider>,
    ) -> PendingFetch<Vec<ExpenseRecord>> {
        let api = self.clone();
        let task = tokio::spawn(async move { api.list_expenses(creds.as_ref()).await });
        PendingFetch {
            operation: Operation::ListExpenses,
            task: Some(task),
        }
    }

    pub fn spawn_create(
        &self,
        creds: Arc<dyn CredentialProvider>,
        expense: NewExpense,
    ) -> PendingFetch<()> {
        let api = self.clone();
        let task =
            tokio::spawn(async move { api.create_expense(creds.as_ref(), &expense).await });
        PendingFetch {
            operation: Operation::CreateExpense,
            task: Some(task),
        }
    }
}

#[derive(Debug)]
pub struct PendingFetch<T> {
    operation: Operation,
    task: Option<JoinHandle<Result<T, FetchError>>>,
}

impl<T> PendingFetch<T> {
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    // The handle stays in `self` while awaiting so dropping this future still aborts the task.
    pub async fn wait(mut self) -> Result<T, FetchError> {
        let operation = self.operation;
        let Some(task) = self.task.as_mut() else {
            return Err(FetchError::Cancelled(operation));
        };
        let joined = task.await;
        self.task = None;

        match joined {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(FetchError::Cancelled(operation)),
            Err(err) => {
                error!("{operation} task failed: {err}");
                Err(FetchError::Panicked(operation))
            }
        }
    }
}

impl<T> Drop for PendingFetch<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
