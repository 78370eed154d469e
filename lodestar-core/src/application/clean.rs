// lodestar-core/src/application/clean.rs

use crate::error::EtlError;
use crate::infrastructure::config::project::load_pipeline_config;
use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::path::Path;

pub fn clean_project(project_dir: &Path) -> Result<(), EtlError> {
    tracing::info!("🧹 Removing build artifacts...");

    let config = load_pipeline_config(project_dir).map_err(EtlError::Infrastructure)?;

    let targets = if config.clean_targets.is_empty() {
        vec!["target".to_string()]
    } else {
        config.clean_targets
    };

    for target_rel_path in targets {
        // Zero-Trust Path Traversal Guard: targets must stay inside the
        // project directory, so absolute paths and '..' hops are rejected.
        let rel = Path::new(&target_rel_path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(EtlError::UnsafePath(target_rel_path));
        }

        let full_path = project_dir.join(&target_rel_path);

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)
                    .map_err(|e| EtlError::Infrastructure(InfrastructureError::Io(e)))?;
            } else {
                fs::remove_file(&full_path)
                    .map_err(|e| EtlError::Infrastructure(InfrastructureError::Io(e)))?;
            }
            println!("   🗑️  Artifact removed: {}", target_rel_path);
        }
    }

    Ok(())
}
