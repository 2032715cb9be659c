use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("marrow")
        .version("0.1.0")
        .author("Marrow Contributors")
        .about("Locate the main article body of an HTML document")
        .arg(clap::arg!([INPUT] "Local HTML file, or '-' for stdin").default_value("-"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (html, text, json)")
                .value_name("FORMAT")
                .default_value("html")
                .value_parser(["html", "text", "json"]),
        )
        .arg(
            clap::arg!(--config <FILE> "Extraction settings as JSON; flags below override it")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--char_threshold <NUM> "Normalized text length that counts as a complete article"))
        .arg(clap::arg!(--top_candidates <NUM> "Number of top candidates to track"))
        .arg(clap::arg!(--title <TITLE> "Page title used to drop a duplicated headline"))
        .arg(clap::arg!(--no_title_check "Keep headlines even when they repeat the page title"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "marrow", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "marrow", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "marrow", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "marrow", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
