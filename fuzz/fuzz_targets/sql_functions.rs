#![no_main]

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use sqlroaring::aggregate::{Aggregate, GroupAnd, GroupCreate, GroupOr};
use sqlroaring::functions::*;
use sqlroaring::{Bitmap, Bitmap64};

#[derive(Arbitrary, Debug)]
enum Arg<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Text(&'a str),
    Blob(&'a [u8]),
    Previous,
}

#[derive(Arbitrary, Debug)]
enum Call<'a> {
    Create(Vec<Arg<'a>>),
    Count(Arg<'a>),
    Add(Arg<'a>, Arg<'a>),
    Remove(Arg<'a>, Arg<'a>),
    And(Arg<'a>, Arg<'a>),
    Or(Arg<'a>, Arg<'a>),
    Xor(Arg<'a>, Arg<'a>),
    Not(Arg<'a>, Arg<'a>),
    AndCount(Arg<'a>, Arg<'a>),
    AndMany(Vec<Arg<'a>>),
    OrMany(Vec<Arg<'a>>),
    Array(Arg<'a>),
    GroupCreate(Vec<Arg<'a>>),
    GroupAnd(Vec<Arg<'a>>),
    GroupOr(Vec<Arg<'a>>),
}

#[derive(Arbitrary, Debug)]
struct FuzzInput<'a> {
    wide: bool,
    calls: Vec<Call<'a>>,
}

fn value<'a>(arg: &'a Arg<'a>, previous: &'a [u8]) -> Value<'a> {
    match *arg {
        Arg::Null => Value::Null,
        Arg::Integer(i) => Value::Integer(i),
        Arg::Real(r) => Value::Real(r),
        Arg::Text(t) => Value::Text(t),
        Arg::Blob(b) => Value::Blob(b),
        Arg::Previous => Value::Blob(previous),
    }
}

fn values<'a>(args: &'a [Arg<'a>], previous: &'a [u8]) -> Vec<Value<'a>> {
    args.iter().map(|arg| value(arg, previous)).collect()
}

fn group<A: Aggregate>(mut group: A, rows: &[Value<'_>]) -> sqlroaring::Result<Vec<u8>> {
    let results: Vec<_> = rows.iter().map(|&row| group.step(row)).collect();
    let finalized = group.finalize();
    // a failed row fails the group
    if let Some(Err(err)) = results.into_iter().find(Result::is_err) {
        assert_eq!(finalized.as_ref(), Err(&err));
    }
    finalized
}

fn count_matches(bitmap: &[u8], count: i64, wide: bool) {
    let members = if wide {
        rb64_array(Value::Blob(bitmap)).map(|v| v.len())
    } else {
        rb_array(Value::Blob(bitmap)).map(|v| v.len())
    };
    assert_eq!(members.ok(), Some(count as usize));
}

fuzz_target!(|input: FuzzInput| {
    let wide = input.wide;
    let mut previous = if wide {
        rb64_create(&[]).unwrap()
    } else {
        rb_create(&[]).unwrap()
    };

    for call in &input.calls {
        let produced = match call {
            Call::Create(args) => {
                let args = values(args, &previous);
                if wide { rb64_create(&args) } else { rb_create(&args) }
            }
            Call::Count(arg) => {
                let arg = value(arg, &previous);
                let count = if wide { rb64_count(arg) } else { rb_count(arg) };
                if let (Ok(count), Value::Blob(bytes)) = (count, arg) {
                    count_matches(bytes, count, wide);
                }
                continue;
            }
            Call::Add(b, e) => {
                let (b, e) = (value(b, &previous), value(e, &previous));
                if wide { rb64_add(b, e) } else { rb_add(b, e) }
            }
            Call::Remove(b, e) => {
                let (b, e) = (value(b, &previous), value(e, &previous));
                if wide { rb64_remove(b, e) } else { rb_remove(b, e) }
            }
            Call::And(l, r) => {
                let (l, r) = (value(l, &previous), value(r, &previous));
                if wide { rb64_and(l, r) } else { rb_and(l, r) }
            }
            Call::Or(l, r) => {
                let (l, r) = (value(l, &previous), value(r, &previous));
                if wide { rb64_or(l, r) } else { rb_or(l, r) }
            }
            Call::Xor(l, r) => {
                let (l, r) = (value(l, &previous), value(r, &previous));
                if wide { rb64_xor(l, r) } else { rb_xor(l, r) }
            }
            Call::Not(l, r) => {
                let (l, r) = (value(l, &previous), value(r, &previous));
                if wide { rb64_not(l, r) } else { rb_not(l, r) }
            }
            Call::AndCount(l, r) => {
                let (l, r) = (value(l, &previous), value(r, &previous));
                let (count, and) = if wide {
                    (rb64_and_count(l, r), rb64_and(l, r))
                } else {
                    (rb_and_count(l, r), rb_and(l, r))
                };
                assert_eq!(count.is_ok(), and.is_ok());
                if let (Ok(count), Ok(and)) = (count, and) {
                    count_matches(&and, count, wide);
                }
                continue;
            }
            Call::AndMany(args) => {
                let args = values(args, &previous);
                if wide { rb64_and_many(&args) } else { rb_and_many(&args) }
            }
            Call::OrMany(args) => {
                let args = values(args, &previous);
                if wide { rb64_or_many(&args) } else { rb_or_many(&args) }
            }
            Call::Array(arg) => {
                let arg = value(arg, &previous);
                if wide {
                    let _ = rb64_array(arg);
                } else {
                    let _ = rb_array(arg);
                }
                continue;
            }
            Call::GroupCreate(rows) => {
                let rows = values(rows, &previous);
                if wide {
                    group(GroupCreate::<Bitmap64>::new(), &rows)
                } else {
                    group(GroupCreate::<Bitmap>::new(), &rows)
                }
            }
            Call::GroupAnd(rows) => {
                let rows = values(rows, &previous);
                if wide {
                    group(GroupAnd::<Bitmap64>::new(), &rows)
                } else {
                    group(GroupAnd::<Bitmap>::new(), &rows)
                }
            }
            Call::GroupOr(rows) => {
                let rows = values(rows, &previous);
                if wide {
                    group(GroupOr::<Bitmap64>::new(), &rows)
                } else {
                    group(GroupOr::<Bitmap>::new(), &rows)
                }
            }
        };
        if let Ok(bytes) = produced {
            // every produced bitmap is accepted again
            if wide {
                rb64_count(Value::Blob(&bytes)).unwrap();
            } else {
                rb_count(Value::Blob(&bytes)).unwrap();
            }
            previous = bytes;
        }
    }
});
