use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    pub creates: AtomicU64,
    pub create_failures: AtomicU64,
    pub destroys: AtomicU64,
    pub destroy_failures: AtomicU64,
    pub cluster_timeouts: AtomicU64,
    pub running_instances: AtomicU64,
}

impl Metrics {
    pub fn record_create(&self) {
        self.creates.fetch_add(1, Ordering::Relaxed);
        self.running_instances.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_create_failure(&self) {
        self.create_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// An instance left `Running`
    pub fn record_stopped(&self) {
        self.running_instances.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_destroy(&self) {
        self.destroys.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_destroy_failure(&self) {
        self.destroy_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.cluster_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn running(&self) -> u64 {
        self.running_instances.load(Ordering::Relaxed)
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chaldeploy=info,kube=info"))
}

#[cfg(not(debug_assertions))]
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .json()
        .init();
}

#[cfg(debug_assertions)]
pub fn init() {
    tracing_subscriber::fmt()
        .pretty()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .init();
}
