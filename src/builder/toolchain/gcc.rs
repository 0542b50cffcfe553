//! GCC/Clang flag tables.

use crate::core::flags::{FlagSet, QuoteStyle};

use super::{FlagInputs, FlagSets, ToolchainVendor};

const BASELINE: &[&str] = &[
    "-g",
    "-Wall",
    "-Wextra",
    "-Wimplicit-fallthrough",
    "-std=c++1y",
    "-fno-rtti",
    "-fvisibility=hidden",
    "-pipe",
    "-Wno-missing-field-initializers",
    "-Wno-unused-variable",
];

/// Clang builds against libc++. GCC rejects `-stdlib=`, so these are
/// never added for it.
const CLANG_COMPILE: &[&str] = &["-stdlib=libc++", "-fcolor-diagnostics"];
const CLANG_LINK: &[&str] = &["-lc++"];

const RELEASE: &[&str] = &["-O3", "-DNDEBUG"];
const DEBUG: &[&str] = &["-D_GLIBCXX_DEBUG", "-D_GLIBCXX_DEBUG_PEDANTIC", "-DDEBUG=1"];

const TEST_DEFINES: &[&str] = &["-DDEBUG=1", "-DUNIT_TEST=1"];

const ASAN_COMPILE: &[&str] = &[
    "-fsanitize=address",
    "-fno-omit-frame-pointer",
    "-fno-optimize-sibling-calls",
];
const ASAN_LINK: &str = "-fsanitize=address";

const HIDDEN_VISIBILITY: &str = "-fvisibility=hidden";
const NO_RTTI: &str = "-fno-rtti";
const MINGW_WINNT: &str = "-D_WIN32_WINNT=0x0501";

pub(super) fn compose(inputs: &FlagInputs<'_>) -> FlagSets {
    let target = inputs.target;
    let clang = inputs.vendor == ToolchainVendor::Clang;

    let mut baseline = FlagSet::from_flags(BASELINE);
    if clang {
        baseline = baseline.with_all(CLANG_COMPILE);
    }
    let baseline = baseline.with_if(target.is_mingw(), MINGW_WINNT);

    // Tests always see the debug defines, independent of the build mode.
    let test_compile = baseline.clone().with_all(TEST_DEFINES);
    let link = if clang {
        FlagSet::from_flags(CLANG_LINK)
    } else {
        FlagSet::new()
    };

    let (compile, test_compile, link) = if inputs.debug {
        // The pedantic containers need RTTI.
        let compile = baseline.with_all(DEBUG).without(NO_RTTI);
        if inputs.wants_sanitizer() {
            (
                compile.with_all(ASAN_COMPILE),
                test_compile.with_all(ASAN_COMPILE),
                link.with(ASAN_LINK),
            )
        } else {
            (compile, test_compile, link)
        }
    } else {
        (baseline.with_all(RELEASE), test_compile, link)
    };

    let (compile, test_compile) = if target.supports_hidden_visibility() {
        (compile, test_compile)
    } else {
        (
            compile.without(HIDDEN_VISIBILITY),
            test_compile.without(HIDDEN_VISIBILITY),
        )
    };
    let link = link.with_if(target.is_mingw(), "-static");

    let test_compile = test_compile.with("-I.");
    let test_link = link.clone().with("-L$builddir/lib");

    FlagSets {
        compile,
        link,
        test_compile,
        test_link,
        quote_style: if target.is_windows() {
            QuoteStyle::Windows
        } else {
            QuoteStyle::Posix
        },
    }
}
