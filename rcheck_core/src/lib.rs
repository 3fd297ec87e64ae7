pub mod value;
pub mod reflect;
pub mod notice;
pub mod lcs;
pub mod dump;
pub mod trail;
pub mod options;
pub mod registry;
pub mod compare;
pub mod dates;
pub mod nil;
pub mod capture;
pub mod tester;

pub use value::{Data, Field, Kind, Pointee, Type, Value, ANY_TYPE};
pub use reflect::{Nil, Reflect};
pub use notice::{join, sort_notices, trail_cmp, Notice, NoticeSentinel, Row};
pub use dump::{Dump, DumpConfig, DumperFn};
pub use options::{Checker, Options, TrailLog};
pub use registry::{register_type_checker, register_type_checker_for};
pub use compare::{equal, equal_len, equal_values, not_equal};
pub use dates::{recent, time_equal};
pub use nil::{is_nil, is_nil_any};
pub use capture::{will_panic, PanicValue};
pub use tester::{assert_equal, assert_not_equal, Spy, StdTester, Tester};
