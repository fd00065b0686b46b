// Request lifecycle for a view's remote data

/// Where a view's last request stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    /// Last request failed; holds a short reason for the status line
    Failed(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn start(&mut self) {
        *self = RequestState::Loading;
    }

    /// Settle from a result, keeping only the failure reason
    pub fn settle<T>(&mut self, result: &Result<T, String>) {
        *self = match result {
            Ok(_) => RequestState::Idle,
            Err(reason) => RequestState::Failed(reason.clone()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut state = RequestState::default();
        assert!(!state.is_loading());

        state.start();
        assert!(state.is_loading());

        state.settle::<()>(&Err("timed out".to_string()));
        assert_eq!(state.error(), Some("timed out"));

        state.start();
        state.settle(&Ok(3));
        assert_eq!(state, RequestState::Idle);
    }
}
