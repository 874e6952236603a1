use anyhow::{Context, Result, bail};
use argline::{ActionRegistry, CommandDefinition};
use argline_schema::{ArgumentSpec, CommandSpec, OptionSpec};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DEFINITION_NAME: &str = "argline.json";

#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub path: PathBuf,
    pub spec: CommandSpec,
}

impl LoadedDefinition {
    pub fn build(&self) -> Result<CommandDefinition> {
        self.spec
            .build(&ActionRegistry::new())
            .with_context(|| format!("invalid definition: {}", self.path.display()))
    }
}

/// Read a definition file, resolving relative paths against the current directory.
pub fn load_definition(path: &Path) -> Result<LoadedDefinition> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = resolve_against(&cwd, path);

    if !path.exists() {
        bail!("definition not found: {}", path.display());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read definition: {}", path.display()))?;
    let spec = CommandSpec::from_json_str(&contents)
        .with_context(|| format!("failed to parse definition JSON: {}", path.display()))?;

    Ok(LoadedDefinition { path, spec })
}

pub fn write_default_definition(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_DEFINITION_NAME);
    if dest.exists() && !overwrite {
        bail!("{} already exists", dest.display());
    }

    let name = guess_program_name(project_dir).unwrap_or_else(|| "my-cli".to_string());
    let spec = starter_spec(name);

    let bytes = serde_json::to_vec_pretty(&spec).context("failed to serialize definition")?;
    let mut out = String::from_utf8(bytes).context("definition is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn starter_spec(name: String) -> CommandSpec {
    let option = |name: &str, short: &str, long: &str, action: &str, description: &str| OptionSpec {
        name: name.to_string(),
        short: Some(short.to_string()),
        long: Some(long.to_string()),
        description: description.to_string(),
        action: action.to_string(),
        callback: None,
        default: Default::default(),
        argument_optional: false,
        help_name: None,
        choices: Vec::new(),
    };

    CommandSpec {
        name,
        description: "Describe your program here".to_string(),
        version: "0.1.0".to_string(),
        force_posix: false,
        add_help_option: true,
        add_version_option: true,
        options: vec![
            option("verbose", "-v", "--verbose", "Counter", "Increase verbosity"),
            option("output", "-o", "--output", "StoreString", "Write output to FILE"),
        ],
        args: vec![ArgumentSpec {
            name: "files".to_string(),
            multiple: true,
            description: "Input files".to_string(),
            help_name: Some("FILE".to_string()),
        }],
        commands: Vec::new(),
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn guess_program_name(project_dir: &Path) -> Option<String> {
    // For `.` or other non-meaningful paths, try the current directory name.
    let file_name = project_dir.file_name().and_then(|s| s.to_str());
    let direct = file_name.filter(|s| !s.is_empty() && *s != "." && *s != "..");
    if let Some(name) = direct {
        return Some(name.to_string());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
}
