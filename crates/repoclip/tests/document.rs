use std::fs;
use std::path::Path;

use insta::assert_snapshot;
use repoclip::app::pipeline::{Delivery, Pipeline, RunOptions, RunOutcome};
use repoclip::app::selection::AcceptDefaults;
use repoclip::domain::errors::ClipboardError;
use repoclip::infra::clipboard::ClipboardSink;
use repoclip::infra::config::Config;

struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy(&mut self, _: &str) -> Result<(), ClipboardError> {
        panic!("stdout delivery must not touch the clipboard");
    }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture() -> tempfile::TempDir {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    write(root, ".gitignore", "build/\n*.tmp\n!keep.tmp\n");
    write(root, "README.md", "# Demo\n");
    write(root, "build/out.rs", "// ignored\n");
    write(root, "keep.tmp", "kept\n");
    write(root, "notes.tmp", "scratch\n");
    write(root, "src/main.rs", "fn main() {}\n");
    write(root, "src/util/mod.rs", "pub fn util() {}\n");
    temp
}

fn compile(root: &Path) -> String {
    let mut options = RunOptions::from_config(root, &Config::default());
    options.message = Some("Summarize the project.".into());
    options.delivery = Delivery::Stdout;

    let mut stdout = Vec::new();
    let outcome = Pipeline::new(&mut AcceptDefaults, &mut NoClipboard, &mut stdout)
        .run(&options)
        .expect("pipeline runs");
    let RunOutcome::Delivered(report) = outcome else {
        panic!("expected delivery");
    };
    assert_eq!(report.skipped, 0);
    String::from_utf8(stdout).unwrap()
}

#[test]
fn compiles_tree_in_walk_order() {
    let temp = fixture();
    assert_snapshot!(compile(temp.path()), @r###"
    Summarize the project.

    .gitignore
    ```
    build/
    *.tmp
    !keep.tmp
    ```

    README.md
    ```md
    # Demo
    ```

    keep.tmp
    ```tmp
    kept
    ```

    src/main.rs
    ```rs
    fn main() {}
    ```

    src/util/mod.rs
    ```rs
    pub fn util() {}
    ```
    "###);
}

#[test]
fn compiling_twice_is_byte_identical() {
    let temp = fixture();
    assert_eq!(compile(temp.path()), compile(temp.path()));
}

#[test]
fn repoclipignore_prunes_directories() {
    let temp = fixture();
    write(temp.path(), ".repoclipignore", "src/\n");
    let text = compile(temp.path());
    assert!(!text.contains("fn main"));
    assert!(!text.contains(".repoclipignore"));
    assert!(text.contains("keep.tmp"));
}
