use anyhow::{Result, bail};
use kvfs_fs::{Namespace, NodeKind};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::browser::{Browser, View};

const HELP: &str = "\
commands:
  ls                   show the current folder or file
  cd <path>            open a folder or file (relative or absolute)
  .. | cd ..           go to the parent folder
  pwd                  print the path in view
  mkdir <name>         create a folder in the current folder
  touch <name>         create an empty file in the current folder
  mv <name> <new>      rename an entry of the current folder
  rm <name>            remove an entry of the current folder
  edit                 replace the open file, ending input with a '.' line
  save <text>          replace the open file with <text>
  exit                 leave the shell
";

enum Outcome {
    Render,
    Print(String),
    Exit,
}

/// Runs the interactive browser until `exit` or end of input.
pub async fn run_shell<R, W>(ns: Namespace, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut browser = Browser::new(ns);
    let mut lines = input.lines();

    match browser.refresh().await {
        Ok(view) => {
            let text = render(view);
            output.write_all(text.as_bytes()).await?;
        }
        Err(err) => output.write_all(format!("error: {err:#}\n").as_bytes()).await?,
    }

    loop {
        let prompt = format!("kvfs:{}> ", browser.view().path());
        output.write_all(prompt.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let text = match execute(&mut browser, command, arg, &mut lines, &mut output).await {
            Ok(Outcome::Render) => render(browser.view()),
            Ok(Outcome::Print(text)) => text,
            Ok(Outcome::Exit) => break,
            Err(err) => format!("error: {err:#}\n"),
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}

async fn execute<R, W>(
    browser: &mut Browser,
    command: &str,
    arg: &str,
    lines: &mut Lines<R>,
    output: &mut W,
) -> Result<Outcome>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match command {
        "exit" | "quit" => return Ok(Outcome::Exit),
        "help" => return Ok(Outcome::Print(HELP.to_owned())),
        "pwd" => return Ok(Outcome::Print(format!("{}\n", browser.view().path()))),
        "ls" => {
            browser.refresh().await?;
        }
        ".." => {
            browser.up().await?;
        }
        "cd" => match arg {
            "" => {
                browser.navigate("/").await?;
            }
            ".." => {
                browser.up().await?;
            }
            _ => {
                let target = browser.target(arg);
                browser.navigate(&target).await?;
            }
        },
        "mkdir" => {
            browser.create_folder(required(command, arg)?).await?;
        }
        "touch" => {
            browser.create_file(required(command, arg)?).await?;
        }
        "rm" => {
            let removed = browser.remove(required(command, arg)?).await?;
            if removed.kind == NodeKind::Folder {
                let mut text = render(browser.view());
                text.push_str("note: run `kvfs gc` to reclaim what was below it\n");
                return Ok(Outcome::Print(text));
            }
        }
        "mv" => {
            let mut parts = arg.split_whitespace();
            let (Some(name), Some(new_name), None) = (parts.next(), parts.next(), parts.next())
            else {
                bail!("usage: mv <name> <new-name>");
            };
            browser.rename(name, new_name).await?;
        }
        "save" => {
            browser.save(arg.as_bytes().to_vec()).await?;
        }
        "edit" => {
            if !matches!(browser.view(), View::File { .. }) {
                bail!("edit: no file is open");
            }
            output
                .write_all(b"enter new contents, end with a line containing only '.'\n")
                .await?;
            output.flush().await?;

            let mut contents = String::new();
            loop {
                let Some(line) = lines.next_line().await? else {
                    bail!("edit: input ended before '.', nothing saved");
                };
                if line == "." {
                    break;
                }
                contents.push_str(&line);
                contents.push('\n');
            }
            browser.save(contents.into_bytes()).await?;
        }
        other => bail!("unknown command {other:?}, try `help`"),
    }
    Ok(Outcome::Render)
}

fn required<'a>(command: &str, arg: &'a str) -> Result<&'a str> {
    if arg.is_empty() {
        bail!("usage: {command} <name>");
    }
    Ok(arg)
}

fn render(view: &View) -> String {
    match view {
        View::Loading { path } => format!("loading {path}\n"),
        View::NotFound { path } => format!("not found: {path}\n"),
        View::Folder { path, entries } => {
            let mut text = format!("{path}\n");
            if entries.is_empty() {
                text.push_str("  (empty)\n");
            }
            for entry in entries {
                match entry.kind {
                    NodeKind::Folder => text.push_str(&format!("  {}/\n", entry.name)),
                    NodeKind::File => text.push_str(&format!("  {}\n", entry.name)),
                }
            }
            text
        }
        View::File { path, contents } => {
            let mut text = format!("{path} ({} bytes)\n", contents.len());
            text.push_str(&String::from_utf8_lossy(contents));
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvfs_fs::FsContext;

    async fn run(ns: &Namespace, script: &str) -> String {
        let mut output = Vec::new();
        run_shell(ns.clone(), script.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn browse_create_and_edit() {
        let ns = Namespace::open(FsContext::memory());
        let script = "\
mkdir docs
cd docs
touch readme
cd readme
edit
first line
second line
.
pwd
exit
";
        let output = run(&ns, script).await;

        assert!(output.starts_with("/\n  (empty)\nkvfs:/> "));
        assert!(output.contains("/docs/readme (0 bytes)\n"));
        // Saving returns to the folder holding the file
        assert!(output.contains("kvfs:/docs> "));
        assert!(output.ends_with("/docs\nkvfs:/docs> "));
        assert_eq!(
            ns.read("/docs/readme").await.unwrap(),
            b"first line\nsecond line\n"
        );
    }

    #[tokio::test]
    async fn rename_remove_and_navigate_up() {
        let ns = Namespace::open(FsContext::memory());
        ns.create_folder("/a").await.unwrap();
        ns.create_file("/a/f", "x").await.unwrap();

        let output = run(&ns, "cd /a\nmv f g\nrm g\n..\nrm a\n").await;

        assert!(output.contains("/a\n  (empty)\n"));
        assert!(output.contains("note: run `kvfs gc`"));
        assert!(ns.list("/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn errors_are_reported_and_the_shell_continues() {
        let ns = Namespace::open(FsContext::memory());
        ns.create_file("/f", "x").await.unwrap();

        let output = run(&ns, "touch f\nbogus\nmv onlyone\ncd missing\nsave nope\nexit\n").await;

        assert!(output.contains("error: an entry named \"f\" already exists"), "{output}");
        assert!(output.contains("error: unknown command \"bogus\""));
        assert!(output.contains("error: usage: mv <name> <new-name>"));
        assert!(output.contains("not found: /missing\n"));
        assert!(output.contains("error: save: no file is open"));
        assert_eq!(ns.read("/f").await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn unfinished_edit_saves_nothing() {
        let ns = Namespace::open(FsContext::memory());
        ns.create_file("/f", "keep").await.unwrap();

        let output = run(&ns, "cd f\nedit\npartial").await;

        assert!(output.contains("nothing saved"));
        assert_eq!(ns.read("/f").await.unwrap(), b"keep");
    }
}
