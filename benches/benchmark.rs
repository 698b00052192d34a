//! パフォーマンスベンチマーク
//!
//! bs2adクレートの変換速度を測定するベンチマーク。
//!
//! - セル単位の変換（DateConverter::convert_all）
//! - ワークブック全体の変換（読み込み・検出・変換・XLSX書き出し）
//!
//! フィクスチャはrust_xlsxwriterでメモリ上に生成します。

use bs2ad::{CellValue, ColumnSelection, ConverterBuilder, DateConverter, OutputFormat};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

/// `rows`行のBS日付を含むワークブックを生成する
fn generate_ledger(rows: u32) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Name").unwrap();
    worksheet.write_string(0, 1, "Miti").unwrap();
    worksheet.write_string(0, 2, "Amount").unwrap();

    for row in 1..=rows {
        let year = 2000 + row % 90 + 1;
        let month = row % 12 + 1;
        let day = row % 29 + 1;
        worksheet
            .write_string(row, 0, format!("Customer {}", row))
            .unwrap();
        worksheet
            .write_string(row, 1, format!("{}/{:02}/{:02}", year, month, day))
            .unwrap();
        worksheet.write_number(row, 2, row as f64 * 1.5).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

fn sample_cells(count: usize) -> Vec<CellValue> {
    (0..count)
        .map(|i| match i % 4 {
            0 => CellValue::from(format!("{}/{:02}/{:02}", 2001 + i % 90, i % 12 + 1, i % 29 + 1)),
            1 => CellValue::from(format!("{:02}-{:02}-{}", i % 29 + 1, i % 12 + 1, 2001 + i % 90)),
            2 => CellValue::Empty,
            _ => CellValue::from("n/a"),
        })
        .collect()
}

fn benchmark_convert_cells(c: &mut Criterion) {
    let converter = DateConverter::default();
    let cells = sample_cells(10_000);

    let mut group = c.benchmark_group("convert_cells");
    group.throughput(Throughput::Elements(cells.len() as u64));
    group.bench_function("convert_all_10k", |b| {
        b.iter(|| black_box(converter.convert_all(black_box(&cells))));
    });
    group.finish();
}

fn benchmark_convert_workbook(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_workbook");
    group.sample_size(10);

    for rows in [1_000u32, 10_000] {
        let data = generate_ledger(rows);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for format in [OutputFormat::Xlsx, OutputFormat::Csv] {
            let converter = ConverterBuilder::new()
                .with_output_format(format)
                .build()
                .unwrap();
            let id = BenchmarkId::new(format.extension(), rows);

            group.bench_with_input(id, &data, |b, data| {
                b.iter(|| {
                    let mut output = Vec::new();
                    converter
                        .convert(
                            Cursor::new(black_box(data.as_slice())),
                            &mut output,
                            ColumnSelection::Auto,
                        )
                        .unwrap();
                    black_box(output)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_convert_cells, benchmark_convert_workbook);
criterion_main!(benches);
