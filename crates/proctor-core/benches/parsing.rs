use criterion::{black_box, criterion_group, criterion_main, Criterion};

use proctor_core::traits::extract_json_object;

fn bench_extract_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_json");

    let fenced = r#"Here are your questions:

```json
{"questions": [{"question": "What is 2 + 2?", "options": ["3", "4", "5", "6"], "correct": 1}]}
```

Good luck!"#;

    let bare = r#"{"questions": [{"question": "Unit of force?", "options": ["N", "J", "W", "Pa"], "correct": 0}]}"#;

    let large = {
        let mut s = String::from("```json\n{\"questions\": [");
        for i in 0..100 {
            if i > 0 {
                s.push(',');
            }
            s.push_str(&format!(
                r#"{{"question": "Question {i}?", "options": ["a", "b", "c", "d"], "correct": {}}}"#,
                i % 4
            ));
        }
        s.push_str("]}\n```");
        s
    };

    group.bench_function("fenced", |b| {
        b.iter(|| extract_json_object(black_box(fenced)))
    });

    group.bench_function("bare", |b| b.iter(|| extract_json_object(black_box(bare))));

    group.bench_function("100_questions", |b| {
        b.iter(|| extract_json_object(black_box(&large)))
    });

    group.finish();
}

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    let small_toml = generate_exam_toml(5);
    let medium_toml = generate_exam_toml(50);
    let large_toml = generate_exam_toml(200);

    for (name, toml) in [
        ("5_questions", &small_toml),
        ("50_questions", &medium_toml),
        ("200_questions", &large_toml),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                proctor_core::parser::parse_exam_str(
                    black_box(toml),
                    black_box("bench.toml".as_ref()),
                )
            })
        });
    }

    group.finish();
}

fn generate_exam_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[exam]
kind = "jee_main"
"#,
    );
    let subjects = ["physics", "chemistry", "mathematics"];
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[questions]]
subject = "{}"
prompt = "Question {i}: which option is correct?"
options = ["first", "second", "third", "fourth"]
correct = {}
topic = "bench"
explanation = "Option {} is correct."
"#,
            subjects[i % subjects.len()],
            i % 4,
            i % 4
        ));
    }
    s
}

criterion_group!(benches, bench_extract_json, bench_toml_parsing);
criterion_main!(benches);
