//! Interpretation of a unit's compiler arguments
//!
//! The front end only needs a small part of a compiler command line: which
//! language to lex, and where to look for included headers. Everything else
//! is ignored.

use crate::project::CompileUnitTask;
use std::path::{Path, PathBuf};

/// Source language of a translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    C,
    Cxx,
}

impl Language {
    /// Language implied by a file extension, if any.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        match extension {
            "c" | "h" | "i" => Some(Language::C),
            "cc" | "cpp" | "cxx" | "c++" | "C" | "hpp" | "hh" | "hxx" | "ii" => Some(Language::Cxx),
            _ => None,
        }
    }

    fn from_dash_x(value: &str) -> Option<Self> {
        match value {
            "c" | "c-header" | "cpp-output" => Some(Language::C),
            "c++" | "c++-header" | "c++-cpp-output" => Some(Language::Cxx),
            _ => None,
        }
    }

    fn from_standard(value: &str) -> Option<Self> {
        if value.starts_with("c++") || value.starts_with("gnu++") {
            Some(Language::Cxx)
        } else if value.starts_with('c') || value.starts_with("gnu") || value.starts_with("iso9899") {
            Some(Language::C)
        } else {
            None
        }
    }
}

/// Header search configuration and language for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOptions {
    pub language: Language,
    /// `-iquote` directories, searched for `"..."` includes only
    pub quote_dirs: Vec<PathBuf>,
    /// `-I` directories
    pub user_dirs: Vec<PathBuf>,
    /// `-isystem` and `-idirafter` directories
    pub system_dirs: Vec<PathBuf>,
    /// False when `-nostdinc` was given
    pub use_default_system_dirs: bool,
}

impl Default for UnitOptions {
    fn default() -> Self {
        UnitOptions {
            language: Language::C,
            quote_dirs: Vec::new(),
            user_dirs: Vec::new(),
            system_dirs: Vec::new(),
            use_default_system_dirs: true,
        }
    }
}

impl UnitOptions {
    /// Derive options from a task's effective arguments; relative include
    /// directories resolve against the task's working directory.
    pub fn from_task(task: &CompileUnitTask) -> Self {
        let mut options = Self::from_arguments(&task.arguments, &task.directory);
        if !task.arguments.iter().any(|arg| arg.starts_with("-x") || arg.starts_with("-std=")) {
            if let Some(language) = Language::from_extension(&task.file) {
                options.language = language;
            }
        }
        options
    }

    /// Interpret an argument list without looking at the source file name.
    pub fn from_arguments(arguments: &[String], directory: &Path) -> Self {
        let mut options = UnitOptions::default();
        let resolve = |dir: &str| -> PathBuf {
            let path = Path::new(dir);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                directory.join(path)
            }
        };

        let mut args = arguments.iter();
        while let Some(arg) = args.next() {
            let arg = arg.as_str();
            if arg == "-nostdinc" || arg == "-nostdinc++" {
                options.use_default_system_dirs = false;
            } else if let Some(value) = arg.strip_prefix("-std=") {
                if let Some(language) = Language::from_standard(value) {
                    options.language = language;
                }
            } else if let Some(value) = take_value(arg, "-x", &mut args) {
                if let Some(language) = Language::from_dash_x(&value) {
                    options.language = language;
                }
            } else if let Some(value) = take_value(arg, "-iquote", &mut args) {
                options.quote_dirs.push(resolve(&value));
            } else if let Some(value) = take_value(arg, "-isystem", &mut args) {
                options.system_dirs.push(resolve(&value));
            } else if let Some(value) = take_value(arg, "-idirafter", &mut args) {
                options.system_dirs.push(resolve(&value));
            } else if let Some(value) = arg.strip_prefix("--include-directory=") {
                options.user_dirs.push(resolve(value));
            } else if let Some(value) = take_value(arg, "-I", &mut args) {
                options.user_dirs.push(resolve(&value));
            }
        }

        options
    }
}

/// Value of a flag given either joined (`-Idir`) or separately (`-I dir`).
fn take_value<'a>(
    arg: &str,
    flag: &str,
    rest: &mut impl Iterator<Item = &'a String>,
) -> Option<String> {
    let joined = arg.strip_prefix(flag)?;
    if joined.is_empty() {
        rest.next().cloned()
    } else {
        Some(joined.trim_start_matches('=').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_include_directories() {
        let options = UnitOptions::from_arguments(
            &args(&["-Iinclude", "-I", "/abs/inc", "-isystem", "third_party", "-iquote", "q", "-DX=1"]),
            Path::new("/work"),
        );

        assert_eq!(
            options.user_dirs,
            vec![PathBuf::from("/work/include"), PathBuf::from("/abs/inc")]
        );
        assert_eq!(options.system_dirs, vec![PathBuf::from("/work/third_party")]);
        assert_eq!(options.quote_dirs, vec![PathBuf::from("/work/q")]);
        assert!(options.use_default_system_dirs);
    }

    #[test]
    fn test_language_selection() {
        let task = CompileUnitTask::new("/p/main.cpp", Vec::new(), "/p");
        assert_eq!(UnitOptions::from_task(&task).language, Language::Cxx);

        let task = CompileUnitTask::new("/p/main.c", Vec::new(), "/p");
        assert_eq!(UnitOptions::from_task(&task).language, Language::C);

        let task = CompileUnitTask::new("/p/main.c", args(&["-x", "c++"]), "/p");
        assert_eq!(UnitOptions::from_task(&task).language, Language::Cxx);

        let task = CompileUnitTask::new("/p/main.c", args(&["-xc++"]), "/p");
        assert_eq!(UnitOptions::from_task(&task).language, Language::Cxx);

        let task = CompileUnitTask::new("/p/main.cc", args(&["-std=gnu11"]), "/p");
        assert_eq!(UnitOptions::from_task(&task).language, Language::C);
    }

    #[test]
    fn test_nostdinc() {
        let options = UnitOptions::from_arguments(&args(&["-nostdinc"]), Path::new("/"));
        assert!(!options.use_default_system_dirs);
    }
}
