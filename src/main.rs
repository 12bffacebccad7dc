// src/main.rs

// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod ui;

use attestation_form_lib::context::{AppCtx, APP_ID, APP_ORG, APP_QUALIFIER, ENV_DATA_DIR};
use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn resolve_data_dir() -> Option<PathBuf> {
    if let Ok(p) = env::var(ENV_DATA_DIR) {
        return Some(PathBuf::from(p));
    }
    if cfg!(debug_assertions) {
        // dev-only sandbox
        if let Ok(home) = env::var("HOME") {
            return Some(PathBuf::from(home).join(".local/share/attestation-form-dev"));
        }
    }
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_ID).map(|p| p.data_dir().to_path_buf())
}

fn main() -> ExitCode {
    let Some(app_data_dir) = resolve_data_dir() else {
        eprintln!("Could not determine app data dir");
        return ExitCode::FAILURE;
    };

    let state = match attestation_form_lib::init_state(&app_data_dir) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("failed to init app state: {e}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = Arc::new(AppCtx::new(app_data_dir));

    let config = match ctx.load_form_config() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("{}: {e}", e.user_msg().short);
            return ExitCode::FAILURE;
        }
    };

    let template = match ctx.load_template() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}: {e}", e.user_msg().short);
            return ExitCode::FAILURE;
        }
    };

    // first argument: page URL or bare `#k=v&...` fragment
    let fragment = env::args().nth(1);

    let run = eframe::run_native(
        "Attestation de déplacement",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| {
            Ok(Box::new(ui::UiApp::new(
                state, ctx, config, template, fragment,
            )))
        }),
    );

    match run {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ui error: {e}");
            ExitCode::FAILURE
        }
    }
}
