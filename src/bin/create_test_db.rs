use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use expense_tracker_rs::{
    Category, Email, Expense, ExpenseType, NewUser, PasswordHash, ValidatedPassword,
    create_expense, create_user, initialize_db,
};

/// A utility for creating a test database for the expense tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "Demo1234";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL} with the password {DEMO_PASSWORD}...");

    let password_hash = PasswordHash::new(
        &ValidatedPassword::new(DEMO_PASSWORD)?,
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        NewUser {
            name: "Demo User".to_owned(),
            email: Email::new(DEMO_EMAIL)?,
            password_hash,
        },
        &conn,
    )?;

    println!("Creating sample records...");

    let samples = [
        ("Salary", 4200.0, ExpenseType::Income, Category::Salary, date!(2024 - 03 - 01)),
        ("Rent", 1650.0, ExpenseType::Expense, Category::BillsAndUtilities, date!(2024 - 03 - 01)),
        ("Groceries", 87.45, ExpenseType::Expense, Category::FoodAndDining, date!(2024 - 03 - 03)),
        ("Bus pass", 45.0, ExpenseType::Expense, Category::Transportation, date!(2024 - 03 - 04)),
        ("Cinema", 32.5, ExpenseType::Expense, Category::Entertainment, date!(2024 - 03 - 09)),
        ("Freelance job", 650.0, ExpenseType::Income, Category::Other, date!(2024 - 03 - 15)),
    ];

    for (title, amount, kind, category, date) in samples {
        let description = (kind == ExpenseType::Income).then(|| "Sample income".to_owned());
        let expense = Expense::build(title, amount, kind, category, date).description(description);
        create_expense(user.id, expense, &conn)?;
    }

    println!("Success!");

    Ok(())
}
