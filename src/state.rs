use crate::config::AppConfig;
use crate::services::calendar::CalendarGateway;
use crate::services::nlp::DateResolver;

pub struct AppState {
    pub config: AppConfig,
    pub calendar: Box<dyn CalendarGateway>,
    pub resolver: Box<dyn DateResolver>,
}
