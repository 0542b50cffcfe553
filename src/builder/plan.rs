//! Build plan generation.
//!
//! Turns a frozen `BuildContext` into an ordered `BuildGraph`: header and
//! variables, the `cxx`/`ar`/`link` rules, library compiles, the archive,
//! test compiles, the test link, the regeneration edge, and finally the
//! default and `all` targets.

use crate::builder::command::{CommandTemplate, Invocation};
use crate::builder::context::BuildContext;
use crate::builder::graph::{BuildEdge, BuildGraph, DepsFormat, GraphError, Rule, PHONY};

/// Oldest build engine version that understands the emitted file.
pub const REQUIRED_VERSION: &str = "1.3";

/// Name of the test binary.
const TEST_BINARY: &str = "test";

/// Plan the whole build graph for `ctx`.
pub fn plan_build(ctx: &BuildContext) -> Result<BuildGraph, GraphError> {
    let mut graph = BuildGraph::new();

    graph.comment("This file is generated by configure.");
    graph.newline();
    graph.variable("ninja_required_version", REQUIRED_VERSION);
    graph.newline();

    graph.comment("The arguments passed to configure, for rerunning it.");
    graph.variable("configure_args", ctx.configure_args.as_str());
    if let Some(env) = ctx.env.display_string() {
        // The escaped space separates the assignments from the program.
        graph.variable("configure_env", format!("{}$ ", env.replace('$', "$$")));
    }
    graph.newline();

    let style = ctx.flags.quote_style;
    graph.variable("builddir", ctx.builddir());
    graph.variable("cxx", ctx.toolchain.compiler.as_str());
    graph.variable("ar", ctx.toolchain.archiver.as_str());
    graph.variable("cflags", ctx.flags.compile.render(style));
    graph.variable("ldflags", ctx.flags.link.render(style));
    graph.newline();

    add_rules(&mut graph, ctx);

    graph.comment("Library source files");
    let mut objects = Vec::new();
    for stem in &ctx.sources.library {
        objects.extend(graph.build(compile_edge(ctx, stem, ctx.sources.library_source(stem))));
    }
    let library = graph.build(BuildEdge::new(library_artifact(ctx), "ar").inputs(objects));
    graph.newline();

    graph.comment("Tests");
    graph.variable("test_cflags", ctx.flags.test_compile.render(style));
    graph.variable("test_ldflags", ctx.flags.test_link.render(style));
    let mut test_objects = Vec::new();
    for stem in &ctx.sources.tests {
        let edge = compile_edge(ctx, stem, ctx.sources.test_source(stem))
            .variable("cflags", "$test_cflags");
        test_objects.extend(graph.build(edge));
    }

    let test_exe = binary_path(ctx, TEST_BINARY);
    let link = BuildEdge::new(test_exe.as_str(), "link")
        .inputs(test_objects)
        .implicit(library)
        .variable("ldflags", "$test_ldflags")
        .variable("libs", link_libs(ctx));
    let top_level = graph.build(link);
    if ctx.target.is_windows() {
        let alias = format!("$builddir/bin/{}", TEST_BINARY);
        graph.build(BuildEdge::new(alias, PHONY).input(test_exe.as_str()));
    }
    graph.newline();

    if !ctx.host.is_mingw() {
        add_regeneration(&mut graph, ctx);
        graph.newline();
    }

    graph.set_default([test_exe.as_str()]);
    graph.newline();
    graph.build(BuildEdge::new("all", PHONY).inputs(top_level));

    graph.validate()?;
    tracing::debug!(
        "planned {} edges ({} library sources, {} test sources)",
        graph.edges().count(),
        ctx.sources.library.len(),
        ctx.sources.tests.len()
    );
    Ok(graph)
}

fn add_rules(graph: &mut BuildGraph, ctx: &BuildContext) {
    let cxx = if ctx.target.is_msvc() {
        Rule::new(
            "cxx",
            Invocation::new("$cxx").args(["/showIncludes", "$cflags", "-c", "$in", "/Fo$out"]),
        )
        .description("CXX $out")
        .deps(DepsFormat::Msvc)
    } else {
        Rule::new(
            "cxx",
            Invocation::new("$cxx").args([
                "-MMD", "-MT", "$out", "-MF", "$out.d", "$cflags", "-c", "$in", "-o", "$out",
            ]),
        )
        .description("CXX $out")
        .depfile("$out.d")
        .deps(DepsFormat::Gcc)
    };
    graph.rule(cxx);
    graph.newline();

    // Archiving runs on the host.
    let ar = if ctx.host.is_msvc() {
        Rule::new(
            "ar",
            Invocation::new("$ar").args(["/nologo", "/ltcg", "/out:$out", "$in"]),
        )
        .description("LIB $out")
    } else if ctx.host.is_mingw() {
        let command = CommandTemplate::new(Invocation::new("$ar").args(["cqs", "$out.tmp", "$in"]))
            .then(Invocation::new("move").args(["/Y", "$out.tmp", "$out"]))
            .via_cmd();
        Rule::new("ar", command).description("AR $out")
    } else {
        let command = CommandTemplate::new(Invocation::new("rm").args(["-f", "$out"]))
            .then(Invocation::new("$ar").args(["crs", "$out", "$in"]));
        Rule::new("ar", command).description("AR $out")
    };
    graph.rule(ar);
    graph.newline();

    let link = if ctx.target.is_msvc() {
        Invocation::new("$cxx").args(["$in", "$libs", "/nologo", "/link", "$ldflags", "/out:$out"])
    } else {
        Invocation::new("$cxx").args(["$ldflags", "-o", "$out", "$in", "$libs"])
    };
    graph.rule(Rule::new("link", link).description("LINK $out"));
    graph.newline();
}

fn add_regeneration(graph: &mut BuildGraph, ctx: &BuildContext) {
    graph.comment("Regenerate build files if build script changes.");
    graph.rule(
        Rule::new(
            "configure",
            Invocation::new(ctx.generator.program.as_str())
                .prefixed("${configure_env}")
                .arg("$configure_args"),
        )
        .description("REGENERATE $out")
        .generator(),
    );
    graph.build(
        BuildEdge::new(ctx.output.as_str(), "configure").implicit(ctx.generator.inputs.iter().cloned()),
    );
}

fn compile_edge(ctx: &BuildContext, stem: &str, source: String) -> BuildEdge {
    BuildEdge::new(object_path(ctx, stem), "cxx").input(source)
}

/// Object path for a source stem.
pub fn object_path(ctx: &BuildContext, stem: &str) -> String {
    format!("$builddir/obj/{}{}", stem, ctx.toolchain.object_extension)
}

/// Static library produced by the archive edge.
pub fn library_artifact(ctx: &BuildContext) -> String {
    let name = &ctx.sources.library_name;
    if ctx.target.is_msvc() {
        format!("$builddir/lib/{}.lib", name)
    } else {
        format!("$builddir/lib/lib{}.a", name)
    }
}

/// Path of a linked binary; Windows targets get an `.exe` suffix.
pub fn binary_path(ctx: &BuildContext, name: &str) -> String {
    if ctx.target.is_windows() {
        format!("$builddir/bin/{}.exe", name)
    } else {
        format!("$builddir/bin/{}", name)
    }
}

fn link_libs(ctx: &BuildContext) -> String {
    let name = &ctx.sources.library_name;
    let mut libs = vec![if ctx.target.is_msvc() {
        format!("{}.lib", name)
    } else {
        format!("-l{}", name)
    }];
    if !ctx.target.is_windows() {
        libs.push("-lpthread".to_string());
    }
    libs.join(" ")
}
