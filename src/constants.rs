// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes label keys used by the deployer
pub mod labels {
    /// Label carrying the application name on every deployed resource
    pub const APP_NAME: &str = "app.kubernetes.io/name";
}

/// The default field manager used for server-side apply
pub const FIELD_MANAGER: &str = "deployer";

/// Environment variables exported to helper programs
pub mod exported {
    pub const NAME: &str = "NAME";
    pub const NAMESPACE: &str = "NAMESPACE";
}

/// Default locations of helper programs and deployment data
pub mod defaults {
    pub const PRINT_CONFIG: &str = "/bin/print_config.py";
    pub const EXPAND_CONFIG: &str = "/bin/expand_config.py";
    pub const CREATE_MANIFESTS: &str = "create_manifests.sh";
    pub const SET_OWNERSHIP: &str = "/bin/set_ownership.py";
    pub const CLEAN_IAM: &str = "clean_iam_resources.sh";

    /// Directory the manifest creator renders into
    pub const MANIFEST_DIR: &str = "/data/manifest-expanded";
    /// Combined manifest written by the ownership setter and applied afterwards
    pub const RESOURCES_FILE: &str = "/data/resources.yaml";
    pub const SCHEMA_FILE: &str = "/data/schema.yaml";
    /// Raw (unexpanded) values, one file per property
    pub const VALUES_DIR: &str = "/data/values";
}

/// Exit codes used when a helper could not be started at all
pub mod exit_codes {
    pub const GENERIC: i32 = 1;
    pub const NOT_EXECUTABLE: i32 = 126;
    pub const NOT_FOUND: i32 = 127;
}
