#![allow(missing_docs)]
//! Benchmarks for SAMI extraction and the MARC codecs.
//!
//! Inputs are generated in memory so the suite needs no fixture files.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sami2marc::{iso2709, marcxml, Dialect, MarcReader, ReaderConfig, Record, SamiReader, XmlStyle};

/// A plain text export with `count` records.
fn text_export(count: usize) -> String {
    let mut export = String::new();
    for i in 0..count {
        export.push_str("*** DOCUMENT BOUNDARY ***\nFORM=MARC\n");
        export.push_str(&format!(".001. |aCKEY{i}\n"));
        export.push_str(".008. |a200101s2020    enk           000 0 eng d\n");
        export.push_str(&format!(".100. 1 |aAuthor, Number {i},|d1900-\n"));
        export.push_str(&format!(".245. 10|aTitle number {i} :|bsubtitle /|cby the author.\n"));
        export.push_str(".260.   |aLondon :|bPublisher,|c2020.\n");
        export.push_str(".650.  0|aSubject|xSubdivision|vForm.\n");
    }
    export
}

/// An XML-tagged export with `count` records.
fn xml_export(count: usize) -> String {
    let mut export = String::from("<?xml version=\"1.0\"?>\n<ListRecords>\n");
    for i in 0..count {
        export.push_str("<record xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n");
        export.push_str(&format!("<header><identifier>{i}</identifier></header>\n"));
        export.push_str(&format!("<marc:controlfield tag=\"001\">CKEY{i}</marc:controlfield>\n"));
        export.push_str(&format!(
            "<marc:datafield tag=\"245\" ind1=\"1\" ind2=\"0\"><marc:subfield code=\"a\">Title {i} &amp; more</marc:subfield><marc:subfield code=\"c\">Author</marc:subfield></marc:datafield>\n"
        ));
        export.push_str("</record>\n");
    }
    export.push_str("</ListRecords>\n");
    export
}

fn records(count: usize) -> Vec<Record> {
    let export = text_export(count);
    SamiReader::new(export.as_bytes(), ReaderConfig::default())
        .map(|r| r.unwrap().into_record())
        .collect()
}

fn benchmark_extract_text_1k(c: &mut Criterion) {
    let export = text_export(1000);
    let mut group = c.benchmark_group("extract");
    group.throughput(Throughput::Bytes(export.len() as u64));
    group.bench_function("text_1k_records", |b| {
        b.iter(|| {
            SamiReader::new(black_box(export.as_bytes()), ReaderConfig::default()).count()
        });
    });

    let export = xml_export(1000);
    let config = ReaderConfig::default().with_dialect(Dialect::Xml);
    group.throughput(Throughput::Bytes(export.len() as u64));
    group.bench_function("xml_1k_records", |b| {
        b.iter(|| SamiReader::new(black_box(export.as_bytes()), config).count());
    });
    group.finish();
}

fn benchmark_encode_1k(c: &mut Criterion) {
    let records = records(1000);
    c.bench_function("encode_1k_records", |b| {
        b.iter(|| {
            records
                .iter()
                .map(|r| iso2709::encode(black_box(r)).unwrap().len())
                .sum::<usize>()
        });
    });
}

fn benchmark_decode_1k(c: &mut Criterion) {
    let bytes: Vec<u8> = records(1000)
        .iter()
        .flat_map(|r| iso2709::encode(r).unwrap())
        .collect();
    c.bench_function("decode_1k_records", |b| {
        b.iter(|| MarcReader::new(black_box(bytes.as_slice())).count());
    });
}

fn benchmark_marcxml_1k(c: &mut Criterion) {
    let records = records(1000);
    c.bench_function("marcxml_1k_records", |b| {
        b.iter(|| {
            records
                .iter()
                .map(|r| marcxml::record_to_xml(black_box(r), XmlStyle::Plain).unwrap().len())
                .sum::<usize>()
        });
    });
}

criterion_group!(
    benches,
    benchmark_extract_text_1k,
    benchmark_encode_1k,
    benchmark_decode_1k,
    benchmark_marcxml_1k
);
criterion_main!(benches);
