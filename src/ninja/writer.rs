//! Line-oriented writer for the ninja file format.
//!
//! Long lines are wrapped at a fixed width with ` $` continuations. A wrap
//! never happens at a space that is itself escaped (`$ `), and continuation
//! lines are indented two levels deeper than the statement they belong to.

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::builder::graph::{BuildEdge, BuildGraph, Rule, Statement};

/// Default maximum line width.
pub const DEFAULT_WIDTH: usize = 78;

/// Escape a path for use in a build statement.
///
/// Spaces and colons are significant in build lines; `$` is only escaped
/// where it already introduces an escaped space.
pub fn escape_path(word: &str) -> String {
    word.replace("$ ", "$$ ").replace(' ', "$ ").replace(':', "$:")
}

/// Writer for ninja statements.
#[derive(Debug)]
pub struct Writer<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> Writer<W> {
    /// Create a writer with the default width.
    pub fn new(out: W) -> Self {
        Writer::with_width(out, DEFAULT_WIDTH)
    }

    /// Create a writer wrapping at `width` columns.
    pub fn with_width(out: W, width: usize) -> Self {
        Writer { out, width }
    }

    /// Consume the writer, returning the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    /// Write a `#` comment, word-wrapped to fit the width.
    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        for line in wrap_words(text, self.width.saturating_sub(2)) {
            writeln!(self.out, "# {}", line)?;
        }
        Ok(())
    }

    /// Write `key = value` at the given indent level.
    pub fn variable(&mut self, key: &str, value: &str, indent: usize) -> io::Result<()> {
        self.line(&format!("{} = {}", key, value), indent)
    }

    /// Write a rule declaration.
    pub fn rule(&mut self, rule: &Rule) -> io::Result<()> {
        self.line(&format!("rule {}", rule.name), 0)?;
        self.variable("command", &rule.command.to_string(), 1)?;
        if let Some(description) = &rule.description {
            self.variable("description", description, 1)?;
        }
        if let Some(depfile) = &rule.depfile {
            self.variable("depfile", depfile, 1)?;
        }
        if rule.generator {
            self.variable("generator", "1", 1)?;
        }
        if let Some(deps) = rule.deps {
            self.variable("deps", deps.as_str(), 1)?;
        }
        Ok(())
    }

    /// Write a build statement and its edge-local bindings.
    pub fn build(&mut self, edge: &BuildEdge) -> io::Result<()> {
        let outputs: Vec<String> = edge.outputs.iter().map(|o| escape_path(o)).collect();

        let mut parts = vec![edge.rule.clone()];
        parts.extend(edge.inputs.iter().map(|i| escape_path(i)));
        if !edge.implicit.is_empty() {
            parts.push("|".to_string());
            parts.extend(edge.implicit.iter().map(|i| escape_path(i)));
        }

        self.line(
            &format!("build {}: {}", outputs.join(" "), parts.join(" ")),
            0,
        )?;

        for (key, value) in &edge.variables {
            self.variable(key, value, 1)?;
        }
        Ok(())
    }

    /// Write a `default` statement.
    pub fn default(&mut self, targets: &[String]) -> io::Result<()> {
        self.line(&format!("default {}", targets.join(" ")), 0)
    }

    /// Write every statement of a graph, in order.
    pub fn write_graph(&mut self, graph: &BuildGraph) -> io::Result<()> {
        for statement in graph.statements() {
            match statement {
                Statement::Comment(text) => self.comment(text)?,
                Statement::Newline => self.newline()?,
                Statement::Variable { name, value } => self.variable(name, value, 0)?,
                Statement::Rule(rule) => self.rule(rule)?,
                Statement::Build(edge) => self.build(edge)?,
                Statement::Default(targets) => self.default(targets)?,
            }
        }
        Ok(())
    }

    /// Write one logical line, wrapping with ` $` continuations.
    fn line(&mut self, text: &str, indent: usize) -> io::Result<()> {
        let mut leading = "  ".repeat(indent);
        let mut text = text;

        while leading.len() + text.len() > self.width {
            let available = self.width.saturating_sub(leading.len() + " $".len());
            let bytes = text.as_bytes();

            // Rightmost unescaped space that keeps the line within width,
            // otherwise the first unescaped space after it.
            let mut space = None;
            let mut end = available;
            while let Some(i) = rfind_space(bytes, end) {
                if count_dollars_before(bytes, i) % 2 == 0 {
                    space = Some(i);
                    break;
                }
                end = i;
            }
            if space.is_none() {
                let mut start = available;
                while let Some(i) = find_space(bytes, start) {
                    if count_dollars_before(bytes, i) % 2 == 0 {
                        space = Some(i);
                        break;
                    }
                    start = i + 1;
                }
            }

            let Some(space) = space else {
                break;
            };
            writeln!(self.out, "{}{} $", leading, &text[..space])?;
            text = &text[space + 1..];
            leading = "  ".repeat(indent + 2);
        }

        writeln!(self.out, "{}{}", leading, text)
    }
}

/// Render a whole graph to a string.
pub fn render(graph: &BuildGraph) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_graph(graph)
        .context("failed to render build graph")?;
    String::from_utf8(writer.into_inner()).context("rendered build graph is not valid UTF-8")
}

/// Last space strictly before `end`.
fn rfind_space(bytes: &[u8], end: usize) -> Option<usize> {
    let end = end.min(bytes.len());
    bytes[..end].iter().rposition(|&b| b == b' ')
}

/// First space at or after `start`.
fn find_space(bytes: &[u8], start: usize) -> Option<usize> {
    if start >= bytes.len() {
        return None;
    }
    bytes[start..]
        .iter()
        .position(|&b| b == b' ')
        .map(|i| i + start)
}

/// Number of consecutive `$` immediately before index `i`.
///
/// Position 0 is never counted, matching the reference writer.
fn count_dollars_before(bytes: &[u8], i: usize) -> usize {
    let mut count = 0;
    let mut index = i;
    while index > 1 && bytes[index - 1] == b'$' {
        count += 1;
        index -= 1;
    }
    count
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::command::Invocation;
    use crate::builder::graph::DepsFormat;

    fn written(f: impl FnOnce(&mut Writer<Vec<u8>>) -> io::Result<()>) -> String {
        let mut w = Writer::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn test_escape_path() {
        assert_eq!(escape_path("a b"), "a$ b");
        assert_eq!(escape_path("c:/x"), "c$:/x");
        assert_eq!(escape_path("$builddir/obj/a.o"), "$builddir/obj/a.o");
    }

    #[test]
    fn test_variable_and_indent() {
        assert_eq!(written(|w| w.variable("cflags", "-g", 0)), "cflags = -g\n");
        assert_eq!(written(|w| w.variable("cflags", "$test_cflags", 1)), "  cflags = $test_cflags\n");
        assert_eq!(written(|w| w.variable("ldflags", "", 0)), "ldflags = \n");
    }

    #[test]
    fn test_rule_attribute_order() {
        let rule = Rule::new(
            "cxx",
            Invocation::new("$cxx").args(["-MMD", "-MT", "$out", "-MF", "$out.d", "$cflags", "-c", "$in", "-o", "$out"]),
        )
        .depfile("$out.d")
        .deps(DepsFormat::Gcc)
        .description("CXX $out");

        assert_eq!(
            written(|w| w.rule(&rule)),
            "rule cxx\n\
             \x20 command = $cxx -MMD -MT $out -MF $out.d $cflags -c $in -o $out\n\
             \x20 description = CXX $out\n\
             \x20 depfile = $out.d\n\
             \x20 deps = gcc\n"
        );
    }

    #[test]
    fn test_build_with_implicit_and_bindings() {
        let edge = BuildEdge::new("$builddir/bin/test", "link")
            .input("$builddir/obj/tests/a.o")
            .implicit(["$builddir/lib/libx.a"])
            .variable("libs", "-lx");

        assert_eq!(
            written(|w| w.build(&edge)),
            "build $builddir/bin/test: link $builddir/obj/tests/a.o | $builddir/lib/libx.a\n\
             \x20 libs = -lx\n"
        );
    }

    #[test]
    fn test_long_line_wraps_with_continuation() {
        let value = (0..20).map(|i| format!("-Wflag{}", i)).collect::<Vec<_>>().join(" ");
        let out = written(|w| w.variable("cflags", &value, 0));

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= DEFAULT_WIDTH, "{}", line);
        }
        assert!(lines[0].ends_with(" $"));
        assert!(lines[1].starts_with("    -Wflag"));
        // Joining the continuations restores the original text.
        let rejoined = lines
            .iter()
            .map(|l| l.trim_start().trim_end_matches(" $"))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, format!("cflags = {}", value));
    }

    #[test]
    fn test_wrap_skips_escaped_space() {
        let mut w = Writer::with_width(Vec::new(), 12);
        w.line("abcdef$ ghijk lmn", 0).unwrap();
        let out = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(out, "abcdef$ ghijk $\n    lmn\n");
    }

    #[test]
    fn test_unbreakable_line_left_long() {
        let word = "x".repeat(100);
        let out = written(|w| w.variable("k", &word, 0));
        assert_eq!(out, format!("k = $\n    {}\n", word));
    }

    #[test]
    fn test_comment_wraps() {
        let text = "word ".repeat(30);
        let out = written(|w| w.comment(&text));
        for line in out.lines() {
            assert!(line.starts_with("# "));
            assert!(line.len() <= DEFAULT_WIDTH);
        }
    }

    #[test]
    fn test_count_dollars_before() {
        assert_eq!(count_dollars_before(b"a$$ b", 3), 2);
        assert_eq!(count_dollars_before(b"a$ b", 2), 1);
        assert_eq!(count_dollars_before(b"$ b", 1), 0);
    }
}
