//! Gateway 应用状态

use std::sync::Arc;

use crate::moderation::Moderator;

/// Gateway 应用状态
///
/// 启动时构造一次，所有请求只读共享
#[derive(Clone)]
pub struct AppState {
    moderator: Arc<Moderator>,
    model: Arc<str>,
}

impl AppState {
    pub fn new(moderator: Moderator, model: impl Into<Arc<str>>) -> Self {
        Self {
            moderator: Arc::new(moderator),
            model: model.into(),
        }
    }

    pub fn moderator(&self) -> &Moderator {
        &self.moderator
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
