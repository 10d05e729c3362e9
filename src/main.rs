use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod compare;
mod dataset;
mod models;
mod report;

use crate::models::{ComparisonRow, Indicator, StudentDashboard};
use crate::report::{format_number, format_value};

const NOT_FOUND_MESSAGE: &str =
    "⚠️ No se encontró información para esta matrícula. Revisa el archivo CSV.";

#[derive(Parser)]
#[command(name = "academic-dashboard")]
#[command(about = "Per-student academic summary over a course tracking export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one student's dashboard
    Show {
        /// Exact student identifier (e.g. A00012345)
        matricula: String,
        #[arg(long, default_value = "seguimiento_alumnos.csv")]
        csv: PathBuf,
        /// Emit the dashboard payload as JSON for a UI layer
        #[arg(long)]
        json: bool,
    },
    /// Export one student's report document
    Report {
        /// Exact student identifier (e.g. A00012345)
        matricula: String,
        #[arg(long, default_value = "seguimiento_alumnos.csv")]
        csv: PathBuf,
        /// Output path; defaults to reporte_<matricula>.txt
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List every student's final grade against the group mean
    Roster {
        #[arg(long, default_value = "seguimiento_alumnos.csv")]
        csv: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            matricula,
            csv,
            json,
        } => {
            let dataset = dataset::load_csv(&csv)?;
            match compare::build_dashboard(&dataset, &matricula) {
                Some(dashboard) if json => {
                    println!("{}", serde_json::to_string_pretty(&dashboard)?);
                }
                Some(dashboard) => render_dashboard(&dashboard),
                None => {
                    tracing::warn!("no record for matricula {matricula}");
                    println!("{NOT_FOUND_MESSAGE}");
                }
            }
        }
        Commands::Report {
            matricula,
            csv,
            out,
        } => {
            let dataset = dataset::load_csv(&csv)?;
            match compare::build_dashboard(&dataset, &matricula) {
                Some(dashboard) => {
                    let out = out.unwrap_or_else(|| {
                        PathBuf::from(format!("reporte_{}.txt", dashboard.student.student_id))
                    });
                    let document =
                        report::build_report(&dashboard, chrono::Local::now().date_naive());
                    std::fs::write(&out, document)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    println!("Reporte escrito en {}.", out.display());
                }
                None => {
                    tracing::warn!("no record for matricula {matricula}");
                    println!("{NOT_FOUND_MESSAGE}");
                }
            }
        }
        Commands::Roster { csv, limit } => {
            let dataset = dataset::load_csv(&csv)?;
            if dataset.records.is_empty() {
                println!("No hay registros en el archivo.");
                return Ok(());
            }

            let mean = compare::group_mean(&dataset, Indicator::FinalGrade);
            println!(
                "Nota final por estudiante (promedio grupo {}):",
                format_value(mean)
            );
            for record in dataset
                .records
                .iter()
                .take(limit.unwrap_or(dataset.records.len()))
            {
                let tier = compare::classify_final_grade(record.final_grade, mean);
                println!(
                    "- {} ({}): {} [{}]",
                    record.student_id,
                    record.full_name.as_deref().unwrap_or("Estudiante sin nombre"),
                    format_value(record.final_grade),
                    tier.label()
                );
            }
        }
    }

    Ok(())
}

fn render_dashboard(dashboard: &StudentDashboard) {
    let student = &dashboard.student;
    println!(
        "Desempeño académico de: {} ({})",
        student.student_id,
        student.full_name.as_deref().unwrap_or("Estudiante sin nombre")
    );

    println!();
    println!("Comparativo con promedio del grupo:");
    render_rows(&dashboard.comparison);

    println!();
    println!("Actividad en plataforma:");
    render_rows(&dashboard.platform_comparison);

    println!();
    println!("Desempeño académico:");
    render_rows(&dashboard.academic_comparison);

    println!();
    println!("Desempeño por actividad:");
    if dashboard.activity_scores.is_empty() {
        println!("- Sin calificaciones registradas.");
    } else {
        for score in &dashboard.activity_scores {
            println!("- {}: {}", score.activity, format_number(score.score));
        }
    }

    println!();
    println!("Feedback sugerido: {}", dashboard.feedback.message());
}

fn render_rows(rows: &[ComparisonRow]) {
    for row in rows {
        println!(
            "- {}: {} (promedio grupo {})",
            row.indicator.label(),
            format_value(row.student),
            format_value(row.group_mean)
        );
    }
}
