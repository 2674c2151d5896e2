pub mod cargo_env {
    pub const CARGO_PKG_NAME: &'static str = env!("CARGO_PKG_NAME");
}

pub mod defaults {
    pub const ADMIN_USER: &'static str = "a@a.a";
    pub const ADMIN_PASSWORD: &'static str = "aaaaaa";
    pub const LOG_DIRECTORY: &'static str = "logs";
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
}

pub mod common {
    pub const MAX_WORKER_THREADS: usize = 8;
}
