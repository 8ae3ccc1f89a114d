//! Text and JSON renderings of a violation list
//!
//! The text form is line oriented and stable so reports can be diffed
//! between runs.

use std::fmt;
use std::io::{self, Write};

use serde_json::json;

use super::engine::DrcSummary;
use super::list::ViolationList;
use super::violation::Violation;

const BANNER_WIDTH: usize = 80;

/// One violation block, numbered from 1 by the caller
struct Numbered<'a>(usize, &'a Violation);

impl fmt::Display for Numbered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Numbered(number, violation) = *self;
        let header = format!("Violation {}", number);
        let width = BANNER_WIDTH / 2 + header.len() / 2;

        writeln!(f, "{}", "*".repeat(BANNER_WIDTH))?;
        writeln!(f, "{:>width$}", header, width = width)?;
        writeln!(f, "title: {}", violation.title())?;
        writeln!(f, "explanation: {}", violation.explanation())?;
        match violation.location() {
            Some(p) => writeln!(f, "location: ({}, {})", p.x, p.y)?,
            None => writeln!(f, "location: unspecified")?,
        }
        writeln!(f, "have_measured: {}", u8::from(violation.have_measured()))?;
        writeln!(f, "measured value: {}", violation.measured().unwrap_or(0))?;
        writeln!(f, "required value: {}", violation.required())?;
        writeln!(f, "object count: {}", violation.object_count())?;

        let ids: Vec<String> = violation.objects().iter().map(|o| o.id.to_string()).collect();
        writeln!(f, "object IDs: {}", ids.join(" "))?;
        let kinds: Vec<String> = violation
            .objects()
            .iter()
            .map(|o| o.kind.code().to_string())
            .collect();
        writeln!(f, "object types: {}", kinds.join(" "))?;
        writeln!(f)
    }
}

/// Write one violation block, numbered from 1 by the caller
pub fn write_violation<W: Write>(out: &mut W, number: usize, violation: &Violation) -> io::Result<()> {
    write!(out, "{}", Numbered(number, violation))
}

/// Write every violation in list order
pub fn write_report<W: Write>(out: &mut W, list: &ViolationList) -> io::Result<()> {
    for (i, violation) in list.iter().enumerate() {
        write_violation(out, i + 1, violation)?;
    }
    Ok(())
}

pub fn report_to_string(list: &ViolationList) -> String {
    list.iter()
        .enumerate()
        .map(|(i, violation)| Numbered(i + 1, violation).to_string())
        .collect()
}

pub fn report_json(list: &ViolationList, summary: &DrcSummary) -> serde_json::Value {
    json!({
        "summary": summary,
        "violations": list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ObjectKind, ObjectRef, Point};

    fn sample() -> ViolationList {
        let mut list = ViolationList::new();
        list.push(Violation::new("Notice", "Scope", None, None, 0, None)).unwrap();
        list.push(Violation::new(
            "Via drill size is too small",
            "Process rules dictate the minimum drill size which can be used",
            Some(Point::new(100, 200)),
            Some(20),
            24,
            Some(&[ObjectRef::new(7, ObjectKind::Via)]),
        ))
        .unwrap();
        list
    }

    #[test]
    fn test_text_report_format() {
        let text = report_to_string(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "*".repeat(80));
        assert_eq!(lines[1], format!("{:>45}", "Violation 1"));
        assert_eq!(lines[2], "title: Notice");
        assert_eq!(lines[4], "location: unspecified");
        assert_eq!(lines[5], "have_measured: 0");
        assert_eq!(lines[8], "object count: 0");
        assert_eq!(lines[9], "object IDs: ");
        assert_eq!(lines[11], "");

        let second = &lines[12..];
        assert_eq!(second[1].trim(), "Violation 2");
        assert_eq!(second[4], "location: (100, 200)");
        assert_eq!(second[5], "have_measured: 1");
        assert_eq!(second[6], "measured value: 20");
        assert_eq!(second[7], "required value: 24");
        assert_eq!(second[8], "object count: 1");
        assert_eq!(second[9], "object IDs: 7");
        assert_eq!(second[10], "object types: 1");
    }

    #[test]
    fn test_written_report_matches_string() {
        let list = sample();
        let mut buf = Vec::new();
        write_report(&mut buf, &list).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), report_to_string(&list));
    }

    #[test]
    fn test_json_report() {
        let summary = DrcSummary {
            violations: 1,
            ..Default::default()
        };
        let value = report_json(&sample(), &summary);
        assert_eq!(value["summary"]["violations"], 1);
        assert_eq!(value["violations"][1]["measured"], 20);
        assert_eq!(value["violations"][1]["objects"][0]["kind"], "via");
        assert!(value["violations"][0]["location"].is_null());
    }
}
