// src/context.rs

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FormError, FormResult};
use crate::template::form_data::{default_form_data, load_form_data_path};
use crate::template::rules::RuleTable;
use crate::template::FormConfig;

pub const APP_QUALIFIER: &str = "org";
pub const APP_ORG: &str = "attestation";
pub const APP_ID: &str = "attestation-form";

pub const ENV_DATA_DIR: &str = "ATTESTATION_DATA_DIR";
pub const ENV_DOWNLOAD_DIR: &str = "ATTESTATION_DOWNLOAD_DIR";
pub const ENV_TEMPLATE: &str = "ATTESTATION_TEMPLATE";
pub const ENV_FORM_DATA: &str = "ATTESTATION_FORM_DATA";
pub const ENV_DEBUG: &str = "ATTESTATION_DEBUG";

pub const DOWNLOADS_DIR: &str = "downloads";

#[derive(Debug, Clone)]
pub struct AppCtx {
    pub app_data_dir: PathBuf,
    pub download_dir: PathBuf,
    pub template_path: Option<PathBuf>,
    pub form_data_path: Option<PathBuf>,
    pub debug_ui: bool,
}

impl AppCtx {
    /// Everything but the data dir comes from the environment.
    pub fn new(app_data_dir: PathBuf) -> Self {
        let debug_ui = env::var(ENV_DEBUG)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let download_dir = env_path(ENV_DOWNLOAD_DIR)
            .unwrap_or_else(|| app_data_dir.join(DOWNLOADS_DIR));

        Self {
            download_dir,
            template_path: env_path(ENV_TEMPLATE),
            form_data_path: env_path(ENV_FORM_DATA),
            app_data_dir,
            debug_ui,
        }
    }

    /// Field definitions from the configured file, else the built-in table,
    /// paired with the standard rules.
    pub fn load_form_config(&self) -> FormResult<FormConfig> {
        let definitions = match &self.form_data_path {
            Some(p) => load_form_data_path(p)?,
            None => default_form_data()?,
        };
        FormConfig::new(RuleTable::standard()?, definitions)
    }

    /// Template bytes; empty when none is configured, which the stamper
    /// treats as "use a blank page".
    pub fn load_template(&self) -> FormResult<Vec<u8>> {
        match &self.template_path {
            Some(p) => read_template(p),
            None => Ok(Vec::new()),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn read_template(path: &Path) -> FormResult<Vec<u8>> {
    fs::read(path).map_err(|e| FormError::TemplateLoad(format!("{}: {e}", path.display())))
}

// ======================================================
// Unit Tests
// ======================================================
