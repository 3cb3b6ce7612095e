use indexmap::IndexMap;
use parser_helper::{Arg, BuiltinCatalog, Catalog, JsonCatalog, ParserHelper, Verbatim, ids};

fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] [--] <arg>...\n");
    println!("Classifies parser function arguments and prints the result as JSON.\n");
    println!("or, use environment variables:");
    println!("    PARSER_HELPER_CATALOG\n");
    println!("Options:");
    println!("    --catalog: Magic word catalog JSON file");
    println!("    --lang: Catalog language (default: en)");
    println!("    --allow: Magic word id to recognise, repeatable (default: all helper ids)");
    println!("    --preview: Evaluate `debug=` as if previewing\n");
    Err(anyhow::Error::msg(err))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Everything after `--` is an argument, even if it looks like an option
    let mut options = std::env::args_os().skip(1).collect::<Vec<_>>();
    let rest = if let Some(at) = options.iter().position(|arg| arg == "--") {
        let rest = options.split_off(at + 1);
        options.pop();
        rest
    } else {
        Vec::new()
    };

    let mut args = pico_args::Arguments::from_vec(options);
    if args.contains(["-h", "--help"]) {
        return usage("Help requested");
    }

    let catalog_path = args
        .opt_value_from_str::<_, String>("--catalog")?
        .or_else(|| std::env::var("PARSER_HELPER_CATALOG").ok());
    let lang = args
        .opt_value_from_str("--lang")?
        .unwrap_or_else(|| "en".to_string());
    let allowed = args.values_from_str::<_, String>("--allow")?;
    let is_preview = args.contains("--preview");

    let free = args.finish();
    if free
        .iter()
        .any(|arg| arg.to_str().is_some_and(|arg| arg.starts_with("--")))
    {
        return usage("Unknown option passed");
    }

    let raw = free
        .into_iter()
        .chain(rest)
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow::anyhow!("Argument {arg:?} is not valid UTF-8"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let catalog: Box<dyn Catalog> = if let Some(path) = catalog_path {
        let catalog = JsonCatalog::from_file(&path, &lang)?;
        log::info!("Loaded catalog {path} for language '{}'", catalog.language());
        Box::new((catalog, BuiltinCatalog))
    } else {
        Box::new(BuiltinCatalog)
    };

    let helper = ParserHelper::new(catalog);
    let allowed = if allowed.is_empty() {
        ids::NAMED_ARGS.to_vec()
    } else {
        allowed.iter().map(String::as_str).collect()
    };

    let raw = raw.into_iter().map(Arg::Text).collect::<Vec<_>>();
    let magic_args = helper.magic_args(&Verbatim, &raw, &allowed)?;

    let duplicates = magic_args
        .duplicates
        .iter()
        .map(|(key, value)| Ok((key.as_str(), value.expand(&Verbatim)?)))
        .collect::<parser_helper::Result<IndexMap<_, _>>>()?;

    let output = serde_json::json!({
        "recognized": &magic_args.recognized,
        "leftover": helper.expand_array(&Verbatim, &magic_args.leftover, false)?,
        "duplicates": duplicates,
        "separator": helper.separator(&magic_args),
        "ifs": helper.check_ifs(&magic_args),
        "any_case": helper.check_any_case(&magic_args),
        "debug": helper.check_debug(is_preview, &magic_args),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
