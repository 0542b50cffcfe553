//! MSVC flag tables.

use crate::core::flags::{FlagSet, QuoteStyle};

use super::{FlagInputs, FlagSets};

const BASELINE: &[&str] = &[
    "/nologo",
    // pdb with debug info
    "/Zi",
    "/W4",
    "/WX",
    "/wd4530",
    "/wd4100",
    "/wd4706",
    "/wd4512",
    "/wd4800",
    "/wd4702",
    "/wd4819",
    // "this" used in base member initializer list
    "/wd4355",
    "/GR-",
    // size_t -> int truncation
    "/wd4267",
    "/DNOMINMAX",
    "/D_CRT_SECURE_NO_WARNINGS",
    "/D_VARIADIC_MAX=10",
];

const LINK: &[&str] = &["/DEBUG"];

const RELEASE_COMPILE: &[&str] = &["/Ox", "/DNDEBUG", "/GL"];
const RELEASE_LINK: &[&str] = &["/LTCG", "/OPT:REF", "/OPT:ICF"];

const TEST_DEFINES: &[&str] = &["/DDEBUG=1", "/DUNIT_TEST=1"];

/// Compose MSVC flags. Sanitizers are never added on this branch.
pub(super) fn compose(inputs: &FlagInputs<'_>) -> FlagSets {
    let baseline = FlagSet::from_flags(BASELINE).with_if(inputs.target.msvc_needs_fs(), "/FS");
    let test_compile = baseline.clone().with_all(TEST_DEFINES).with("/I.");
    let link = FlagSet::from_flags(LINK);

    let (compile, link) = if inputs.debug {
        (baseline, link)
    } else {
        (
            baseline.with_all(RELEASE_COMPILE),
            link.with_all(RELEASE_LINK),
        )
    };

    let test_link = link.clone().with("/libpath:$builddir/lib");

    FlagSets {
        compile,
        link,
        test_compile,
        test_link,
        quote_style: QuoteStyle::Windows,
    }
}
