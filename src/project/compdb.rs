//! `compile_commands.json` loading
//!
//! A compilation database lists, per translation unit, the working directory,
//! the source file and the compiler invocation (either an argument array or a
//! single shell-quoted command string). Each entry becomes a
//! [`CompileUnitTask`] carrying only the arguments that matter for parsing.

use crate::project::error::{ProjectError, ProjectResult};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up inside a project directory
pub const DATABASE_FILE: &str = "compile_commands.json";

/// One unit of work: a source file, its arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnitTask {
    /// Absolute path of the source file
    pub file: PathBuf,
    /// Compiler arguments without the compiler, `-c`, `-o` and the source
    pub arguments: Vec<String>,
    pub directory: PathBuf,
}

impl CompileUnitTask {
    pub fn new(file: impl Into<PathBuf>, arguments: Vec<String>, directory: impl Into<PathBuf>) -> Self {
        CompileUnitTask {
            file: file.into(),
            arguments,
            directory: directory.into(),
        }
    }
}

/// Raw database entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileCommand {
    /// The source file, resolved against the entry's directory
    pub fn source_path(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }

    /// Full command line including the compiler; `arguments` wins over
    /// `command` when both are present.
    pub fn argv(&self) -> ProjectResult<Vec<String>> {
        match (&self.arguments, &self.command) {
            (Some(arguments), _) => Ok(arguments.clone()),
            (None, Some(command)) => split_command(command),
            (None, None) => Err(ProjectError::MissingCommand {
                file: self.file.display().to_string(),
            }),
        }
    }

    pub fn to_task(&self) -> ProjectResult<CompileUnitTask> {
        let file = self.source_path();
        let arguments = effective_arguments(&self.argv()?, &file, &self.directory);
        Ok(CompileUnitTask::new(file, arguments, self.directory.clone()))
    }
}

/// A loaded `compile_commands.json`
#[derive(Debug, Clone)]
pub struct CompilationDatabase {
    path: PathBuf,
    commands: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Load `<dir>/compile_commands.json`.
    pub fn load_from_directory(dir: &Path) -> ProjectResult<Self> {
        if !dir.is_dir() {
            return Err(ProjectError::ProjectDirNotFound {
                path: dir.to_path_buf(),
            });
        }
        Self::load_from_file(&dir.join(DATABASE_FILE))
    }

    pub fn load_from_file(path: &Path) -> ProjectResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ProjectError::DatabaseNotFound {
                path: path.to_path_buf(),
            },
            _ => ProjectError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_json_str(&text, path)
    }

    /// Parse database text; `path` is used for error messages and
    /// [`CompilationDatabase::path`].
    pub fn from_json_str(text: &str, path: &Path) -> ProjectResult<Self> {
        let commands: Vec<CompileCommand> =
            serde_json::from_str(text).map_err(|source| ProjectError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("loaded {} entries from {}", commands.len(), path.display());

        Ok(CompilationDatabase {
            path: path.to_path_buf(),
            commands,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// One task per entry, in file order
    pub fn tasks(&self) -> ProjectResult<Vec<CompileUnitTask>> {
        self.commands.iter().map(CompileCommand::to_task).collect()
    }
}

/// Split a command string the way a POSIX shell would, without expansion.
pub fn split_command(command: &str) -> ProjectResult<Vec<String>> {
    let unbalanced = || ProjectError::UnbalancedQuotes {
        command: command.to_string(),
    };
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unbalanced()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some('\n') => {}
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unbalanced()),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unbalanced()),
                    }
                }
            }
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(ch) => {
                    in_word = true;
                    current.push(ch);
                }
                None => {
                    in_word = true;
                    current.push('\\');
                }
            },
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        args.push(current);
    }

    Ok(args)
}

/// Strip a full command line down to the arguments that configure parsing:
/// the compiler, `-c`, `-o <out>`/`-o<out>` and the source file itself go.
pub fn effective_arguments(argv: &[String], source: &Path, directory: &Path) -> Vec<String> {
    let mut kept = Vec::new();
    let mut args = argv.iter().skip(1);

    while let Some(arg) = args.next() {
        if arg == "-c" {
            continue;
        }
        if arg == "-o" {
            args.next();
            continue;
        }
        if arg.starts_with("-o") {
            continue;
        }
        if !arg.starts_with('-') && names_source(arg, source, directory) {
            continue;
        }
        kept.push(arg.clone());
    }

    kept
}

fn names_source(arg: &str, source: &Path, directory: &Path) -> bool {
    let path = Path::new(arg);
    if path.is_absolute() {
        path == source
    } else {
        directory.join(path) == source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_command_quoting() {
        let args = split_command(r#"cc -DNAME="a b" -I'my dir' plain\ space "esc\"aped" -c x.c"#).unwrap();

        assert_eq!(
            args,
            strings(&["cc", "-DNAME=a b", "-Imy dir", "plain space", "esc\"aped", "-c", "x.c"])
        );
        assert!(split_command("").unwrap().is_empty());
    }

    #[test]
    fn test_split_command_unbalanced() {
        assert!(matches!(
            split_command("cc 'oops"),
            Err(ProjectError::UnbalancedQuotes { .. })
        ));
        assert!(matches!(
            split_command("cc \"oops"),
            Err(ProjectError::UnbalancedQuotes { .. })
        ));
    }

    #[test]
    fn test_effective_arguments() {
        let argv = strings(&[
            "/usr/bin/clang", "-c", "-Iinc", "-o", "out/main.o", "-DX", "src/main.c", "-Wall", "-ofast.o",
        ]);
        let args = effective_arguments(&argv, Path::new("/p/src/main.c"), Path::new("/p"));

        assert_eq!(args, strings(&["-Iinc", "-DX", "-Wall"]));
    }

    #[test]
    fn test_entries_to_tasks() {
        let json = r#"[
            {"directory": "/p", "file": "a.c", "arguments": ["cc", "-c", "a.c", "-Iinc"]},
            {"directory": "/p/build", "file": "/p/b.cpp", "command": "c++ -std=c++17 -o b.o -c /p/b.cpp", "output": "b.o"}
        ]"#;
        let database = CompilationDatabase::from_json_str(json, Path::new("/p/compile_commands.json")).unwrap();
        let tasks = database.tasks().unwrap();

        assert_eq!(database.len(), 2);
        assert_eq!(tasks[0], CompileUnitTask::new("/p/a.c", strings(&["-Iinc"]), "/p"));
        assert_eq!(tasks[1], CompileUnitTask::new("/p/b.cpp", strings(&["-std=c++17"]), "/p/build"));
    }

    #[test]
    fn test_entry_without_command() {
        let json = r#"[{"directory": "/p", "file": "a.c"}]"#;
        let database = CompilationDatabase::from_json_str(json, Path::new("db.json")).unwrap();

        assert!(matches!(database.tasks(), Err(ProjectError::MissingCommand { .. })));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            CompilationDatabase::load_from_directory(&dir.path().join("missing")),
            Err(ProjectError::ProjectDirNotFound { .. })
        ));
        assert!(matches!(
            CompilationDatabase::load_from_directory(dir.path()),
            Err(ProjectError::DatabaseNotFound { .. })
        ));

        fs::write(dir.path().join(DATABASE_FILE), "{ not json").unwrap();
        assert!(matches!(
            CompilationDatabase::load_from_directory(dir.path()),
            Err(ProjectError::Json { .. })
        ));
    }
}
