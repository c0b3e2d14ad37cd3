// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios driving the full pipeline through the public API.

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;

use tagfilter::core::config::FilterParams;
use tagfilter::core::output::{CsvSink, MemorySink, CSV_HEADER};
use tagfilter::core::registry::TagRegistry;
use tagfilter::core::run::StreamDriver;
use tagfilter::core::tag::TagId;

const REGISTRY_HEADER: &str = "\"proj\",\"id\",\"tagFreq\",\"fcdFreq\",\"g1\",\"g2\",\"g3\",\"bi\",\"dfreq\",\"g1.sd\",\"g2.sd\",\"g3.sd\",\"bi.sd\",\"dfreq.sd\",\"filename\"";

fn registry_line(proj: &str, id: u32, freq: f64, bi: f64) -> String {
    format!("\"{proj}\",{id},{freq},{freq},20.3,30.1,40.2,{bi},1.2,0.1,0.1,0.1,0.01,0.2,\"reg.wav\"")
}

fn registry(lines: &[String]) -> TagRegistry {
    let body = format!("{REGISTRY_HEADER}\n{}\n", lines.join("\n"));
    TagRegistry::from_reader(Cursor::new(body)).unwrap()
}

fn hit_line(ts: f64, id: u32, freq: f64) -> String {
    format!("{ts},{id},\"A1\",-40.0,NA,NA,{freq},\"Lotek4\"")
}

fn params() -> FilterParams {
    FilterParams {
        burst_slop: 0.02,
        slop_expansion: 0.001,
        max_skipped_bursts: 3,
        hits_to_confirm: 2,
        fail_on_ambiguity: false,
    }
}

fn filter(reg: &TagRegistry, p: &FilterParams, lines: &[String]) -> MemorySink {
    let mut driver = StreamDriver::new(reg, p).unwrap();
    let mut sink = MemorySink::new();
    driver
        .run(Cursor::new(lines.join("\n")), &mut sink)
        .unwrap();
    driver.finish(&mut sink).unwrap();
    sink
}

#[test]
fn burst_interval_separates_tags_sharing_a_code() {
    // two physical tags share coarse code 123 and differ only in interval
    let reg = registry(&[
        registry_line("projA", 123, 166.380, 5.0),
        registry_line("projB", 1123, 166.380, 7.0),
    ]);
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(100.0, 123, 166.380),
            hit_line(107.0, 123, 166.380),
            hit_line(114.0, 123, 166.380),
        ],
    );
    assert_eq!(sink.len(), 3);
    assert!(sink.records.iter().all(|r| r.tag.id == TagId(1123)));
    assert!(sink.records.iter().all(|r| r.tag.project == "projB"));
}

#[test]
fn noise_hits_never_confirm() {
    let reg = registry(&[registry_line("p", 123, 166.380, 5.0)]);
    // gaps never near a multiple of 5 s
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(1.3, 123, 166.380),
            hit_line(3.9, 123, 166.380),
            hit_line(7.2, 123, 166.380),
        ],
    );
    assert!(sink.is_empty());
}

#[test]
fn skipped_bursts_tolerated_up_to_limit() {
    let reg = registry(&[registry_line("p", 123, 166.380, 5.0)]);
    // gaps of 1x, 3x and 4x the interval; the limit of 3 skips allows them
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(5.0, 123, 166.380),
            hit_line(20.0, 123, 166.380),
            hit_line(40.0, 123, 166.380),
        ],
    );
    assert_eq!(sink.len(), 4);
    let run_ids: Vec<u64> = sink.records.iter().map(|r| r.run_id).collect();
    assert!(run_ids.iter().all(|&id| id == run_ids[0]));
    assert_eq!(
        sink.records.iter().map(|r| r.pos_in_run).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn gap_beyond_limit_starts_a_new_run() {
    let reg = registry(&[registry_line("p", 123, 166.380, 5.0)]);
    // 5 bursts missed between the pairs, one more than tolerated
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(5.0, 123, 166.380),
            hit_line(35.0, 123, 166.380),
            hit_line(40.0, 123, 166.380),
        ],
    );
    assert_eq!(sink.len(), 4);
    let run_ids: std::collections::BTreeSet<u64> =
        sink.records.iter().map(|r| r.run_id).collect();
    assert_eq!(run_ids.len(), 2);
}

#[test]
fn burst_slop_reflects_timing_error() {
    let reg = registry(&[registry_line("p", 123, 166.380, 5.0)]);
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(5.012, 123, 166.380),
            // one burst skipped, observed 0.015 late against 2 x 5.0
            hit_line(15.027, 123, 166.380),
        ],
    );
    assert_eq!(sink.len(), 3);
    assert_eq!(sink.records[0].burst_slop, 0.0);
    assert!((sink.records[1].burst_slop - 0.012).abs() < 1e-9);
    assert!((sink.records[2].burst_slop - 0.015).abs() < 1e-9);
}

#[test]
fn frequencies_are_tracked_independently() {
    let reg = registry(&[
        registry_line("p", 123, 166.380, 5.0),
        registry_line("p", 123123, 150.100, 5.0),
    ]);
    // interleaved streams on two frequencies, same coarse code
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(2.0, 123, 150.100),
            hit_line(5.0, 123, 166.380),
            hit_line(7.0, 123, 150.100),
        ],
    );
    assert_eq!(sink.len(), 4);
    let mut by_tag: std::collections::BTreeMap<u32, Vec<f64>> = Default::default();
    for r in &sink.records {
        by_tag.entry(r.tag.id.0).or_default().push(r.hit.ts);
    }
    assert_eq!(by_tag[&123], vec![0.0, 5.0]);
    assert_eq!(by_tag[&123123], vec![2.0, 7.0]);
}

#[test]
fn higher_confirmation_count_requires_more_evidence() {
    let reg = registry(&[registry_line("p", 123, 166.380, 5.0)]);
    let p = params().with_hits_to_confirm(3);
    let two = filter(
        &reg,
        &p,
        &[hit_line(0.0, 123, 166.380), hit_line(5.0, 123, 166.380)],
    );
    assert!(two.is_empty());

    let three = filter(
        &reg,
        &p,
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(5.0, 123, 166.380),
            hit_line(10.0, 123, 166.380),
        ],
    );
    assert_eq!(three.len(), 3);
}

#[test]
fn emission_preserves_hit_order_within_a_run() {
    let reg = registry(&[registry_line("p", 123, 166.380, 5.0)]);
    let sink = filter(
        &reg,
        &params(),
        &[
            hit_line(0.0, 123, 166.380),
            hit_line(5.0, 123, 166.380),
            hit_line(10.0, 123, 166.380),
            hit_line(15.0, 123, 166.380),
        ],
    );
    let seqs: Vec<u64> = sink.records.iter().map(|r| r.hit.seq_no).collect();
    let mut sorted = seqs.clone();
    sorted.sort_unstable();
    assert_eq!(seqs, sorted);
}

#[test]
fn csv_output_from_files_on_disk() {
    let mut reg_file = NamedTempFile::new().unwrap();
    writeln!(reg_file, "{REGISTRY_HEADER}").unwrap();
    writeln!(reg_file, "{}", registry_line("proj", 123, 166.380, 5.0)).unwrap();
    reg_file.flush().unwrap();

    let mut hits_file = NamedTempFile::new().unwrap();
    writeln!(hits_file, "\"ts\",\"id\",\"ant\",\"sig\",\"lat\",\"lon\",\"antfreq\",\"codeset\"")
        .unwrap();
    writeln!(hits_file, "{}", hit_line(100.0, 123, 166.380)).unwrap();
    writeln!(hits_file, "{}", hit_line(105.0, 123, 166.380)).unwrap();
    hits_file.flush().unwrap();

    let reg = TagRegistry::from_path(reg_file.path()).unwrap();
    let mut driver = StreamDriver::new(&reg, &params()).unwrap();
    let mut sink = CsvSink::new(Vec::new(), true).unwrap();
    let reader = std::io::BufReader::new(std::fs::File::open(hits_file.path()).unwrap());
    driver.run(reader, &mut sink).unwrap();
    let summary = driver.finish(&mut sink).unwrap();
    assert_eq!(summary.hits_processed, 2);
    assert_eq!(summary.malformed_lines, 0);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("100.0000,\"A1\",123,\"proj\",1,1,"));
    assert!(lines[2].starts_with("105.0000,\"A1\",123,\"proj\",1,2,"));
}
