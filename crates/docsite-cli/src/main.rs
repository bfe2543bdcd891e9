use std::process;

fn main() {
    match docsite_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("docsite error: {err}");
            process::exit(1);
        }
    }
}
