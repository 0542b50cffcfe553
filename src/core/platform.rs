//! Platform identity and capability predicates.
//!
//! Two platforms exist per run: the *target* the build produces code for and
//! the *host* that runs the build tools. Everything downstream branches on
//! the capability predicates here instead of on platform names.

use serde::Serialize;

use crate::util::process::ToolProbe;

/// A named platform, as accepted by `--platform` and `--host`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlatformVariant {
    #[value(name = "linux")]
    Linux,
    #[value(name = "darwin")]
    Darwin,
    #[value(name = "freebsd")]
    FreeBsd,
    #[value(name = "openbsd")]
    OpenBsd,
    #[value(name = "solaris")]
    Solaris,
    #[value(name = "sunos5")]
    SunOs5,
    #[value(name = "mingw")]
    Mingw,
    #[value(name = "msvc")]
    Msvc,
    #[value(name = "gnukfreebsd")]
    GnuKFreeBsd,
    #[value(name = "bitrig")]
    Bitrig,
    #[value(name = "netbsd")]
    NetBsd,
    #[value(name = "aix")]
    Aix,
    #[value(name = "dragonfly")]
    DragonFly,
}

/// What a platform can and cannot do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub windows: bool,
    pub msvc: bool,
    pub mingw: bool,
    pub sunos: bool,
    /// Accepts `-fvisibility=hidden`
    pub hidden_visibility: bool,
}

impl Capabilities {
    const POSIX: Capabilities = Capabilities {
        windows: false,
        msvc: false,
        mingw: false,
        sunos: false,
        hidden_visibility: true,
    };

    const SUN: Capabilities = Capabilities {
        sunos: true,
        hidden_visibility: false,
        ..Capabilities::POSIX
    };

    const MINGW: Capabilities = Capabilities {
        windows: true,
        mingw: true,
        hidden_visibility: false,
        ..Capabilities::POSIX
    };

    const MSVC: Capabilities = Capabilities {
        windows: true,
        msvc: true,
        hidden_visibility: false,
        ..Capabilities::POSIX
    };
}

impl PlatformVariant {
    /// Every variant, in the order shown in `--help`.
    pub const ALL: [PlatformVariant; 13] = [
        PlatformVariant::Linux,
        PlatformVariant::Darwin,
        PlatformVariant::FreeBsd,
        PlatformVariant::OpenBsd,
        PlatformVariant::Solaris,
        PlatformVariant::SunOs5,
        PlatformVariant::Mingw,
        PlatformVariant::Msvc,
        PlatformVariant::GnuKFreeBsd,
        PlatformVariant::Bitrig,
        PlatformVariant::NetBsd,
        PlatformVariant::Aix,
        PlatformVariant::DragonFly,
    ];

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformVariant::Linux => "linux",
            PlatformVariant::Darwin => "darwin",
            PlatformVariant::FreeBsd => "freebsd",
            PlatformVariant::OpenBsd => "openbsd",
            PlatformVariant::Solaris => "solaris",
            PlatformVariant::SunOs5 => "sunos5",
            PlatformVariant::Mingw => "mingw",
            PlatformVariant::Msvc => "msvc",
            PlatformVariant::GnuKFreeBsd => "gnukfreebsd",
            PlatformVariant::Bitrig => "bitrig",
            PlatformVariant::NetBsd => "netbsd",
            PlatformVariant::Aix => "aix",
            PlatformVariant::DragonFly => "dragonfly",
        }
    }

    /// Capability table lookup.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            PlatformVariant::Solaris | PlatformVariant::SunOs5 => Capabilities::SUN,
            PlatformVariant::Mingw => Capabilities::MINGW,
            PlatformVariant::Msvc => Capabilities::MSVC,
            PlatformVariant::Linux
            | PlatformVariant::Darwin
            | PlatformVariant::FreeBsd
            | PlatformVariant::OpenBsd
            | PlatformVariant::GnuKFreeBsd
            | PlatformVariant::Bitrig
            | PlatformVariant::NetBsd
            | PlatformVariant::Aix
            | PlatformVariant::DragonFly => Capabilities::POSIX,
        }
    }

    /// Detect the variant of the machine running this process.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS, cfg!(target_env = "gnu"))
    }

    /// Map an OS name (as in `std::env::consts::OS`) onto a variant.
    ///
    /// Windows builds against the GNU environment are mingw. Unknown
    /// Unix-likes fall back to generic POSIX (`linux`).
    pub fn from_os(os: &str, gnu_env: bool) -> Self {
        match os {
            "linux" | "android" => PlatformVariant::Linux,
            "macos" | "ios" => PlatformVariant::Darwin,
            "freebsd" => PlatformVariant::FreeBsd,
            "openbsd" => PlatformVariant::OpenBsd,
            "solaris" | "illumos" => PlatformVariant::Solaris,
            "netbsd" => PlatformVariant::NetBsd,
            "aix" => PlatformVariant::Aix,
            "dragonfly" => PlatformVariant::DragonFly,
            "windows" if gnu_env => PlatformVariant::Mingw,
            "windows" => PlatformVariant::Msvc,
            other => {
                tracing::debug!("unknown OS `{}`, treating as generic POSIX", other);
                PlatformVariant::Linux
            }
        }
    }
}

impl std::fmt::Display for PlatformVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved platform. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    variant: PlatformVariant,
    /// Whether the installed `cl` understands (and needs) `/FS`
    msvc_needs_fs: bool,
}

impl Platform {
    /// Create a platform without probing any tools.
    pub fn new(variant: PlatformVariant) -> Self {
        Platform {
            variant,
            msvc_needs_fs: false,
        }
    }

    /// Mark whether the MSVC compiler needs `/FS`. Ignored for other variants.
    pub fn with_msvc_needs_fs(mut self, needs_fs: bool) -> Self {
        self.msvc_needs_fs = needs_fs && self.is_msvc();
        self
    }

    /// Resolve a platform from an optional name, detecting the running
    /// machine when absent.
    ///
    /// For MSVC, `cl /nologo /?` is probed once to learn whether the
    /// compiler advertises `/FS`.
    pub fn resolve(name: Option<PlatformVariant>, probe: &dyn ToolProbe) -> Self {
        let variant = name.unwrap_or_else(PlatformVariant::detect);
        let platform = Platform::new(variant);

        if !platform.is_msvc() {
            return platform;
        }

        let needs_fs = probe
            .help_text("cl", &["/nologo", "/?"])
            .map(|help| help.contains("/FS"))
            .unwrap_or(false);
        tracing::debug!("msvc /FS support: {}", needs_fs);
        platform.with_msvc_needs_fs(needs_fs)
    }

    /// Get the platform variant.
    pub fn variant(&self) -> PlatformVariant {
        self.variant
    }

    fn caps(&self) -> Capabilities {
        self.variant.capabilities()
    }

    pub fn is_windows(&self) -> bool {
        self.caps().windows
    }

    pub fn is_msvc(&self) -> bool {
        self.caps().msvc
    }

    pub fn is_mingw(&self) -> bool {
        self.caps().mingw
    }

    /// Sun-derived platforms (`solaris`, `sunos5`).
    pub fn is_sunos(&self) -> bool {
        self.caps().sunos
    }

    pub fn supports_hidden_visibility(&self) -> bool {
        self.caps().hidden_visibility
    }

    pub fn msvc_needs_fs(&self) -> bool {
        self.msvc_needs_fs
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.variant.fmt(f)
    }
}
