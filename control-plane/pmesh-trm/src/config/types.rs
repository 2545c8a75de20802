use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct TrmConfig {
    #[envconfig(from = "HTTP_PORT", default = "8088")]
    pub http_port: u16,

    /// Label key that identifies a workload version on subsets.
    /// Env: PMESH_TRM_VERSION_LABEL
    #[envconfig(from = "PMESH_TRM_VERSION_LABEL", default = "version")]
    pub version_label: String,

    /// Version that receives default-route traffic when an environment does
    /// not override it. Env: PMESH_TRM_DEFAULT_VERSION
    #[envconfig(from = "PMESH_TRM_DEFAULT_VERSION", default = "shared")]
    pub default_version: String,

    /// Successful-cycle requeue interval in seconds.
    /// Env: PMESH_TRM_REQUEUE_SECS
    #[envconfig(from = "PMESH_TRM_REQUEUE_SECS", default = "60")]
    pub requeue_secs: u64,

    /// Failed-cycle requeue interval in seconds.
    /// Env: PMESH_TRM_ERROR_REQUEUE_SECS
    #[envconfig(from = "PMESH_TRM_ERROR_REQUEUE_SECS", default = "15")]
    pub error_requeue_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let cfg = TrmConfig::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(cfg.http_port, 8088);
        assert_eq!(cfg.version_label, "version");
        assert_eq!(cfg.default_version, "shared");
        assert_eq!(cfg.requeue_secs, 60);
        assert_eq!(cfg.error_requeue_secs, 15);
    }

    #[test]
    fn env_overrides() {
        let mut env = HashMap::new();
        env.insert(
            "PMESH_TRM_VERSION_LABEL".to_string(),
            "app-version".to_string(),
        );
        env.insert("PMESH_TRM_REQUEUE_SECS".to_string(), "120".to_string());
        let cfg = TrmConfig::init_from_hashmap(&env).unwrap();
        assert_eq!(cfg.version_label, "app-version");
        assert_eq!(cfg.requeue_secs, 120);
        // untouched fields keep their defaults
        assert_eq!(cfg.default_version, "shared");
        assert_eq!(cfg.error_requeue_secs, 15);
    }
}
