//! Classification of failures this library did not produce.
//!
//! An ordered table of `(predicate, class)` rows, first match wins:
//!
//! | Order | Matches                                          | Class               |
//! |-------|--------------------------------------------------|---------------------|
//! | 1     | `io::ErrorKind::UnexpectedEof`                   | EOF                 |
//! | 2     | `io::ErrorKind::BrokenPipe`                      | Closed Pipe Error   |
//! | 3     | `io::ErrorKind::WriteZero`                       | Short Write Error   |
//! | 4     | `io::ErrorKind::WouldBlock`                      | Would Block Error   |
//! | 5     | `io::ErrorKind::TimedOut`                        | Timeout Error       |
//! | 6     | `AddrInUse`, `AddrNotAvailable`                  | Addr Error          |
//! | 7     | `ConnectionRefused/Reset/Aborted`, `NotConnected`| Network Op Error    |
//! | 8     | `nix::errno::Errno` (unix only)                  | Errno Error         |
//! | 9     | `io::Error` with a raw OS error                  | Syscall Error       |
//! | 10    | `std::net::AddrParseError`                       | Network Parse Error |
//! | 11    | any other `io::Error`                            | IO Error            |
//! | -     | anything else                                    | System Error        |
//!
//! The table is tied to std and nix as they are today. Porting to another
//! set of primitives means re-deriving it, not extending it.

use std::error::Error as StdError;
use std::io;
use std::net::AddrParseError;

use once_cell::sync::Lazy;

use crate::class::{ErrorClass, SYSTEM_ERROR};
use crate::classes::{
    ADDR_ERROR, CLOSED_PIPE_ERROR, EOF, ERRNO_ERROR, IO_ERROR, NET_OP_ERROR, NET_PARSE_ERROR,
    SHORT_WRITE_ERROR, SYSCALL_ERROR, TIMEOUT_ERROR, WOULD_BLOCK_ERROR,
};

type Predicate = fn(&(dyn StdError + 'static)) -> bool;

fn io_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    err.downcast_ref::<io::Error>().map(|e| e.kind())
}

fn kind_in(err: &(dyn StdError + 'static), kinds: &[io::ErrorKind]) -> bool {
    io_kind(err).map_or(false, |k| kinds.contains(&k))
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn is_errno(err: &(dyn StdError + 'static)) -> bool {
            err.is::<nix::errno::Errno>()
        }
    } else {
        fn is_errno(_err: &(dyn StdError + 'static)) -> bool {
            false
        }
    }
}

fn is_eof(e: &(dyn StdError + 'static)) -> bool {
    kind_in(e, &[io::ErrorKind::UnexpectedEof])
}

fn is_closed_pipe(e: &(dyn StdError + 'static)) -> bool {
    kind_in(e, &[io::ErrorKind::BrokenPipe])
}

fn is_short_write(e: &(dyn StdError + 'static)) -> bool {
    kind_in(e, &[io::ErrorKind::WriteZero])
}

fn is_would_block(e: &(dyn StdError + 'static)) -> bool {
    kind_in(e, &[io::ErrorKind::WouldBlock])
}

fn is_timeout(e: &(dyn StdError + 'static)) -> bool {
    kind_in(e, &[io::ErrorKind::TimedOut])
}

fn is_addr(e: &(dyn StdError + 'static)) -> bool {
    kind_in(e, &[io::ErrorKind::AddrInUse, io::ErrorKind::AddrNotAvailable])
}

fn is_net_op(e: &(dyn StdError + 'static)) -> bool {
    kind_in(
        e,
        &[
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::NotConnected,
        ],
    )
}

fn is_syscall(e: &(dyn StdError + 'static)) -> bool {
    e.downcast_ref::<io::Error>()
        .and_then(|io| io.raw_os_error())
        .is_some()
}

fn is_addr_parse(e: &(dyn StdError + 'static)) -> bool {
    e.is::<AddrParseError>()
}

fn is_io(e: &(dyn StdError + 'static)) -> bool {
    e.is::<io::Error>()
}

static TABLE: Lazy<Vec<(Predicate, &'static ErrorClass)>> = Lazy::new(|| {
    vec![
        // sentinels
        (is_eof as Predicate, *EOF),
        (is_closed_pipe as Predicate, *CLOSED_PIPE_ERROR),
        (is_short_write as Predicate, *SHORT_WRITE_ERROR),
        (is_would_block as Predicate, *WOULD_BLOCK_ERROR),
        (is_timeout as Predicate, *TIMEOUT_ERROR),
        (is_addr as Predicate, *ADDR_ERROR),
        (is_net_op as Predicate, *NET_OP_ERROR),
        // structural
        (is_errno as Predicate, *ERRNO_ERROR),
        (is_syscall as Predicate, *SYSCALL_ERROR),
        (is_addr_parse as Predicate, *NET_PARSE_ERROR),
        (is_io as Predicate, *IO_ERROR),
    ]
});

/// Class for a failure not produced by this library.
pub fn classify(err: &(dyn StdError + 'static)) -> &'static ErrorClass {
    TABLE
        .iter()
        .find(|(matches, _)| matches(err))
        .map(|(_, class)| *class)
        .unwrap_or(*SYSTEM_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::{ADDR_ERROR, NETWORK_ERROR};
    use crate::error::Message;
    use rstest::rstest;

    #[rstest]
    #[case(io::ErrorKind::UnexpectedEof, "EOF")]
    #[case(io::ErrorKind::BrokenPipe, "Closed Pipe Error")]
    #[case(io::ErrorKind::WriteZero, "Short Write Error")]
    #[case(io::ErrorKind::WouldBlock, "Would Block Error")]
    #[case(io::ErrorKind::TimedOut, "Timeout Error")]
    #[case(io::ErrorKind::AddrInUse, "Addr Error")]
    #[case(io::ErrorKind::AddrNotAvailable, "Addr Error")]
    #[case(io::ErrorKind::ConnectionRefused, "Network Op Error")]
    #[case(io::ErrorKind::ConnectionReset, "Network Op Error")]
    #[case(io::ErrorKind::NotConnected, "Network Op Error")]
    #[case(io::ErrorKind::NotFound, "IO Error")]
    #[case(io::ErrorKind::PermissionDenied, "IO Error")]
    fn io_kinds(#[case] kind: io::ErrorKind, #[case] expected: &str) {
        let err = io::Error::new(kind, "x");
        assert_eq!(classify(&err).name(), expected);
    }

    #[test]
    fn eof_descends_from_system() {
        let err = io::Error::from(io::ErrorKind::UnexpectedEof);
        let class = classify(&err);
        assert_eq!(class, *EOF);
        assert!(class.is(*IO_ERROR));
        assert!(class.is(*SYSTEM_ERROR));
    }

    #[test]
    fn raw_os_error_without_sentinel_kind() {
        // ENOENT maps to NotFound, which has no sentinel row
        let err = io::Error::from_raw_os_error(2);
        assert_eq!(classify(&err), *SYSCALL_ERROR);
    }

    #[test]
    fn sentinel_beats_raw_os_error() {
        let err = io::Error::from_raw_os_error(32); // EPIPE on linux
        if err.kind() == io::ErrorKind::BrokenPipe {
            assert_eq!(classify(&err), *CLOSED_PIPE_ERROR);
        }
    }

    #[cfg(unix)]
    #[test]
    fn nix_errno() {
        let err = nix::errno::Errno::EINVAL;
        assert_eq!(classify(&err), *ERRNO_ERROR);
    }

    #[test]
    fn addr_parse() {
        let err = "not an address".parse::<std::net::IpAddr>().unwrap_err();
        let class = classify(&err);
        assert_eq!(class, *NET_PARSE_ERROR);
        assert!(class.is(*NETWORK_ERROR));
        assert!(!class.is(*ADDR_ERROR));
    }

    #[test]
    fn unknown_defaults_to_system() {
        assert_eq!(classify(&Message("who knows".into())), *SYSTEM_ERROR);
        assert_eq!(classify(&std::fmt::Error), *SYSTEM_ERROR);
    }
}
