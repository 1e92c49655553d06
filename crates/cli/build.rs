use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("sitegraft")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Sitegraft Contributors")
        .about("Mirror a website, inject a keyword and serve it with nginx")
        .arg(clap::arg!(--url <URL> "Seed URL of the site to mirror (http or https)"))
        .arg(clap::arg!(--keyword <KW> "Keyword injected into the site"))
        .arg(
            clap::Arg::new("max_depth")
                .long("max-depth")
                .alias("maxDepth")
                .value_name("N")
                .default_value("2")
                .help("Maximum link depth followed from the seed URL"),
        )
        .arg(
            clap::Arg::new("document_root")
                .long("document-root")
                .value_name("DIR")
                .default_value("/var/www/site")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .help("Directory served by nginx"),
        )
        .arg(
            clap::Arg::new("nginx_conf")
                .long("nginx-conf")
                .value_name("FILE")
                .default_value("/etc/nginx/conf.d/site.conf")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .help("Path of the generated nginx server block"),
        )
        .arg(clap::arg!(--port <PORT> "Port nginx listens on").default_value("8088"))
        .arg(
            clap::Arg::new("nginx_bin")
                .long("nginx-bin")
                .value_name("BIN")
                .default_value("nginx")
                .help("nginx binary used to validate and reload"),
        )
        .arg(
            clap::Arg::new("skip_reload")
                .long("skip-reload")
                .action(clap::ArgAction::SetTrue)
                .help("Write the config but do not validate or reload nginx"),
        )
        .arg(
            clap::Arg::new("work_dir")
                .long("work-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .help("Directory for the per-run working tree"),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(
            clap::Arg::new("user_agent")
                .long("user-agent")
                .value_name("UA")
                .help("Custom User-Agent for HTTP requests"),
        )
        .arg(clap::arg!(--json "Print the run summary as JSON on stdout"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "sitegraft", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "sitegraft", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "sitegraft", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "sitegraft", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
