mod service;

pub use service::TimerService;
