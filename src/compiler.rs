//! Orchestrates one compilation: resolves configuration, drives the
//! scanner/parser/symbol-table/emitter pipeline, writes the `.j` file, and
//! (when a jar is resolvable) invokes the external assembler.

use crate::config::Config;
use crate::emit::Emitter;
use crate::error::DriverError;
use std::path::{Path, PathBuf};

pub struct CompileOutcome {
    pub class_file: PathBuf,
    pub assembled: bool,
}

/// Compiles `source_path` to Jasmin assembly and, if an assembler jar can be
/// resolved, assembles it. Mirrors the original compiler's `main`: scan,
/// parse-typecheck-emit, then shell out — but as library functions the CLI
/// binary calls, not inline in `main` itself.
pub fn compile_file(source_path: &Path, jasmin_jar_env: Option<&str>) -> Result<CompileOutcome, DriverError> {
    let source = std::fs::read(source_path).map_err(|source| DriverError::CannotOpen {
        path: source_path.display().to_string(),
        source,
    })?;

    let config = Config::load(source_path)?;

    log::info!("scanning and parsing {}", source_path.display());
    let emitter: Emitter = crate::parser::parse(source)?;
    log::info!("emitted class {}", emitter.class_name());

    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let class_file = emitter.write_class_file(&output_dir)?;

    let jasmin_jar = jasmin_jar_env
        .map(PathBuf::from)
        .or_else(|| config.jasmin_jar.clone());

    let assembled = match jasmin_jar {
        Some(jar) => {
            log::info!("assembling with {}", jar.display());
            Emitter::assemble(&jar, &class_file, &output_dir)?;
            true
        }
        None => {
            return Err(DriverError::JasminJarNotSet);
        }
    };

    Ok(CompileOutcome { class_file, assembled })
}
