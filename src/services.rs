pub mod export_service;
pub use export_service::ExportService;
pub mod label_service;
pub use label_service::LabelService;
pub mod report_service;
pub use report_service::ReportService;
pub mod telegram_service;
pub use telegram_service::TelegramService;
