//! Call-site macros.
//!
//! Thin wrappers over [`Logger::write`](crate::Logger::write) and
//! [`Logger::write_without_deco`](crate::Logger::write_without_deco) that fill
//! in the routing mask, destinations and the enclosing function name.
//!
//! | macro | level | destinations |
//! |-------|-------|--------------|
//! | `log_err!` `log_warn!` `log_info!` `log_dbg!` | Critical / Warn / Info / Debug | all |
//! | `con_err!` `con_warn!` `con_info!` `con_dbg!` | Critical / Warn / Info / Debug | console |
//! | `log_msg!` | Debug, undecorated | file + debugger |
//! | `con_msg!` | Debug, undecorated | console |
//!
//! # Examples
//!
//! ```
//! use serial_logger::prelude::*;
//! use serial_logger::{log_info, con_err};
//!
//! let logger = Logger::builder().console_writer(MemoryWriter::new()).build();
//! logger.start(LogLevel::Debug, None::<&str>).unwrap();
//!
//! let port = 8080;
//! log_info!(logger, "Server listening on port {}", port);
//! con_err!(logger, "bind failed: {}", "address in use");
//!
//! logger.stop();
//! ```

/// Name of the enclosing function, without module path or closure suffixes.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// Write with explicit mask, level and destinations.
///
/// ```
/// # use serial_logger::prelude::*;
/// # let logger = Logger::new();
/// use serial_logger::log_write;
/// log_write!(logger, 0x4, LogLevel::Warn, Destinations::FILE, "retry {} of {}", 1, 3);
/// ```
#[macro_export]
macro_rules! log_write {
    ($logger:expr, $mask:expr, $level:expr, $dest:expr, $($arg:tt)+) => {
        $logger.write(
            $mask,
            $level,
            $dest,
            $crate::__function_name!(),
            ::std::format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! log_err {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::ERROR, $crate::Destinations::ALL, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::Warn, $crate::Destinations::ALL, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::Info, $crate::Destinations::ALL, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_dbg {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::Debug, $crate::Destinations::ALL, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_msg {
    ($logger:expr, $($arg:tt)+) => {
        $logger.write_without_deco(
            $crate::MASK_SYS,
            $crate::LogLevel::Debug,
            $crate::Destinations::FILE | $crate::Destinations::DEBUGGER,
            ::std::format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! con_err {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::ERROR, $crate::Destinations::CONSOLE, $($arg)+)
    };
}

#[macro_export]
macro_rules! con_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::Warn, $crate::Destinations::CONSOLE, $($arg)+)
    };
}

#[macro_export]
macro_rules! con_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::Info, $crate::Destinations::CONSOLE, $($arg)+)
    };
}

#[macro_export]
macro_rules! con_dbg {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_write!($logger, $crate::MASK_SYS, $crate::LogLevel::Debug, $crate::Destinations::CONSOLE, $($arg)+)
    };
}

#[macro_export]
macro_rules! con_msg {
    ($logger:expr, $($arg:tt)+) => {
        $logger.write_without_deco(
            $crate::MASK_SYS,
            $crate::LogLevel::Debug,
            $crate::Destinations::CONSOLE,
            ::std::format_args!($($arg)+),
        )
    };
}
