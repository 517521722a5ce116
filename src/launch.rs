use std::path::PathBuf;

use crate::navigation::Page;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub data_root: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub start_page: Option<Page>,
}

pub fn parse_launch_options(args: &[String]) -> Result<LaunchOptions, String> {
    let mut options = LaunchOptions::default();
    let mut args = args.iter();

    while let Some(flag) = args.next() {
        let flag = flag.trim();
        match flag {
            "--data-dir" | "--data-root" => {
                options.data_root = Some(PathBuf::from(flag_value(flag, args.next())?));
            }
            "--database" | "--db" => {
                options.database = Some(PathBuf::from(flag_value(flag, args.next())?));
            }
            "--page" => {
                let name = flag_value(flag, args.next())?;
                let page = Page::from_name(name)
                    .ok_or_else(|| format!("Unknown page '{name}' for --page."))?;
                if page == Page::DiagnosisResult {
                    return Err(
                        "The result page needs a selected visit; open it from history.".to_string(),
                    );
                }
                options.start_page = Some(page);
            }
            other => return Err(format!("Unrecognized argument '{other}'.")),
        }
    }

    Ok(options)
}

fn flag_value<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, String> {
    match value.map(|value| value.trim()) {
        Some(value) if !value.is_empty() && !value.starts_with("--") => Ok(value),
        _ => Err(format!("Missing value after {flag}.")),
    }
}
