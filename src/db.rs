use sqlx::PgPool;

const UPSERT_STUDENT: &str = r#"
INSERT INTO students (rno, name, department, starting_year, ending_year, cgpa, lc, lc_id)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (rno) DO UPDATE
SET name = EXCLUDED.name,
    department = EXCLUDED.department,
    starting_year = EXCLUDED.starting_year,
    ending_year = EXCLUDED.ending_year,
    cgpa = EXCLUDED.cgpa,
    lc = EXCLUDED.lc,
    lc_id = EXCLUDED.lc_id
"#;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

type SeedStudent = (
    &'static str,
    &'static str,
    &'static str,
    i32,
    i32,
    Option<f64>,
    Option<i32>,
    Option<&'static str>,
);

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students: Vec<SeedStudent> = vec![
        ("20CS041", "Divya Raghavan", "CSE", 2020, 2024, Some(5.7), Some(12), Some("divyar")),
        ("20IT009", "Priya Nair", "IT", 2020, 2024, Some(8.8), Some(97), Some("priyanair")),
        ("20IT025", "Saurabh Joshi", "IT", 2020, 2024, Some(6.9), Some(75), Some("saurabhj")),
        ("21AM021", "Rohan Das", "AIML", 2021, 2025, Some(8.4), Some(189), Some("rohand")),
        ("21CS014", "Ananya Sharma", "CSE", 2021, 2025, Some(9.2), Some(312), Some("ananya-sharma")),
        ("21CS027", "Rahul Verma", "CSE", 2021, 2025, Some(7.5), Some(154), Some("rahulv")),
        ("21EC019", "Meera Pillai", "ECE", 2021, 2025, Some(7.9), None, None),
        ("21IT032", "Arjun Mehta", "IT", 2021, 2025, None, Some(203), Some("arjunm")),
        ("22AM003", "Vikram Iyer", "AIML", 2022, 2026, Some(6.4), Some(48), Some("vikram_iyer")),
        ("22AM011", "Sneha Kulkarni", "AIML", 2022, 2026, Some(8.1), None, None),
        ("22CS008", "Karthik Reddy", "CSE", 2022, 2026, Some(9.6), Some(260), Some("kreddy")),
        ("22EC005", "Ishita Banerjee", "ECE", 2022, 2026, None, None, None),
    ];

    for (rno, name, department, starting_year, ending_year, cgpa, lc, lc_id) in students {
        sqlx::query(UPSERT_STUDENT)
            .bind(rno)
            .bind(name)
            .bind(department)
            .bind(starting_year)
            .bind(ending_year)
            .bind(cgpa)
            .bind(lc)
            .bind(lc_id)
            .execute(pool)
            .await?;
    }

    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        rno: String,
        name: String,
        department: String,
        starting_year: i32,
        ending_year: i32,
        cgpa: Option<f64>,
        lc: Option<i32>,
        lc_id: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut imported = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        sqlx::query(UPSERT_STUDENT)
            .bind(&row.rno)
            .bind(&row.name)
            .bind(&row.department)
            .bind(row.starting_year)
            .bind(row.ending_year)
            .bind(row.cgpa)
            .bind(row.lc)
            .bind(&row.lc_id)
            .execute(pool)
            .await?;

        imported += 1;
    }

    Ok(imported)
}
