// outfitter - generate and refine outfits around one clothing photo

use anyhow::Context;
use clap::Parser;
use outfitter::config::{API_KEY_ENV, OutfitterConfig};
use outfitter::styling::{
    ClothingStyle, EncodedImage, GeminiBackend, ImageFile, Outfit, OutfitStyle, Stylist,
    StylistError, UserProfile, WorkflowState,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use termimad::{MadSkin, crossterm::style::Color};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate complete outfits around a clothing item", long_about = None)]
struct Args {
    /// Photo of the clothing item (PNG, JPEG or WEBP, up to ~10MB)
    image: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for generated outfits (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Gemini model (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Preferred styles, e.g. --prefer streetwear --prefer minimalist
    #[arg(long, value_parser = parse_clothing_style)]
    prefer: Vec<ClothingStyle>,

    /// Favorite colors, e.g. "navy blue, beige"
    #[arg(long, default_value = "")]
    colors: String,

    /// Colors, patterns or items to avoid, e.g. "neon, animal prints"
    #[arg(long, default_value = "")]
    avoid: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_clothing_style(value: &str) -> Result<ClothingStyle, String> {
    ClothingStyle::from_label(value).ok_or_else(|| {
        let known: Vec<&str> = ClothingStyle::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown style '{}', expected one of: {}", value, known.join(", "))
    })
}

fn create_markdown_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.headers[0].set_fg(Color::Cyan);
    skin.headers[1].set_fg(Color::Blue);
    skin.bold.set_fg(Color::White);
    skin.italic.set_fg(Color::Magenta);
    skin.inline_code.set_fg(Color::Yellow);
    skin
}

/// Writes outfits into one timestamped directory per upload
struct Gallery {
    root: PathBuf,
    current: Option<PathBuf>,
}

impl Gallery {
    fn new(root: PathBuf) -> Self {
        Self { root, current: None }
    }

    fn start_batch(&mut self) -> anyhow::Result<()> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let dir = self.root.join(format!("outfits-{}", stamp));
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        self.current = Some(dir);
        Ok(())
    }

    fn location(&self) -> String {
        self.current
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default()
    }

    fn save(&self, outfit: &Outfit) -> anyhow::Result<PathBuf> {
        let dir = self
            .current
            .as_ref()
            .context("no output directory for this batch")?;
        let image = EncodedImage::from_data_url(&outfit.image_url)?;
        let path = dir.join(format!(
            "{}.{}",
            outfit.style.as_str().to_lowercase(),
            image.extension()
        ));
        std::fs::write(&path, image.decode_bytes()?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

fn report(err: &StylistError) {
    tracing::debug!(error = %err, "request failed");
    if let Some(banner) = err.banner() {
        eprintln!("❌ {}", banner);
    }
}

fn report_save_failure(what: &str, err: &anyhow::Error) {
    let detail = format!("{:#}", err);
    tracing::warn!(error = %detail, "saving {} failed", what);
    eprintln!("❌ Could not save {}. Try `regenerate` or `reset`.", what);
}

fn render_state(skin: &MadSkin, state: &WorkflowState, gallery: &Gallery) {
    let mut md = String::from("## Outfits\n\n");
    match state.upload() {
        Some(upload) => md.push_str(&format!("Item: `{}`\n\n", upload.display_url)),
        None => md.push_str("*Nothing uploaded.*\n\n"),
    }
    let location = gallery.location();
    for outfit in state.outfits() {
        md.push_str(&format!("* **{}** in `{}`\n", outfit.style, location));
    }
    if let Some(error) = state.error() {
        md.push_str(&format!("\n*{}*\n", error));
    }
    skin.print_text(&md);
}

fn render_profile(skin: &MadSkin, profile: &UserProfile) {
    let mut md = String::from("## Profile\n\n");
    for style in ClothingStyle::ALL {
        let mark = if profile.preferred_styles.contains(&style) { "x" } else { " " };
        md.push_str(&format!("* [{}] {}\n", mark, style));
    }
    md.push_str(&format!("\n**Favorite colors:** {}\n", or_dash(&profile.favorite_colors)));
    md.push_str(&format!("**Avoid:** {}\n", or_dash(&profile.disliked)));
    skin.print_text(&md);
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn print_help(skin: &MadSkin) {
    let styles: Vec<&str> = OutfitStyle::ALL.iter().map(|s| s.as_str()).collect();
    skin.print_text(&format!(
        r#"## Commands

* `edit <style> <instruction>` - change one outfit ({})
* `regenerate` - generate the outfits again
* `upload <path>` - start over with another item
* `profile` - show preferences
* `prefer <style, ...>` - set preferred styles (empty clears)
* `colors <text>` / `avoid <text>` - set favorite or disliked colors
* `list` - show current outfits
* `reset` - clear everything
* `quit`
"#,
        styles.join(", ")
    ));
}

async fn generate(stylist: &Stylist, gallery: &mut Gallery, file: ImageFile) {
    println!("🧵 Styling your personalized outfits...");
    let result = stylist.upload(file).await;
    save_batch(gallery, result);
}

/// Write a finished batch and return how many outfits landed on disk.
///
/// Nothing here ends the session: failures are reported and the prompt
/// comes back.
fn save_batch(gallery: &mut Gallery, result: Result<Vec<Outfit>, StylistError>) -> usize {
    let outfits = match result {
        Ok(outfits) => outfits,
        Err(err) => {
            report(&err);
            return 0;
        }
    };
    if let Err(err) = gallery.start_batch() {
        report_save_failure("the outfit folder", &err);
        return 0;
    }
    outfits
        .iter()
        .filter(|outfit| save_outfit(gallery, outfit).is_some())
        .count()
}

fn save_outfit(gallery: &Gallery, outfit: &Outfit) -> Option<PathBuf> {
    match gallery.save(outfit) {
        Ok(path) => {
            println!("  ✓ {} → {}", outfit.style, path.display());
            Some(path)
        }
        Err(err) => {
            report_save_failure(&format!("the {} outfit", outfit.style), &err);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (GEMINI_API_KEY)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("outfitter={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = OutfitterConfig::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.gemini.model = model;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let api_key = config
        .api_key()
        .with_context(|| format!("no API key: set {} or gemini.api_key in the config", API_KEY_ENV))?;

    let backend = GeminiBackend::new(config.gemini.clone(), api_key)?;

    println!("👗 Outfitter v{}", env!("CARGO_PKG_VERSION"));
    println!("📡 Using model: {}\n", backend.model());
    let profile = UserProfile {
        preferred_styles: args.prefer.into_iter().collect(),
        favorite_colors: args.colors,
        disliked: args.avoid,
    };
    let stylist = Stylist::with_profile(Arc::new(backend), profile);
    let mut gallery = Gallery::new(config.output_dir.clone());
    let skin = create_markdown_skin();

    generate(&stylist, &mut gallery, ImageFile::from_path(&args.image)).await;
    print_help(&skin);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => print_help(&skin),
            "list" => render_state(&skin, &stylist.state(), &gallery),
            "profile" => render_profile(&skin, &stylist.profile()),
            "reset" => {
                stylist.reset();
                println!("Cleared. Use `upload <path>` to start again.");
            }
            "upload" if !rest.is_empty() => {
                generate(&stylist, &mut gallery, ImageFile::from_path(rest)).await;
            }
            "regenerate" => {
                println!("🧵 Styling your personalized outfits...");
                let result = stylist.regenerate().await;
                save_batch(&mut gallery, result);
            }
            "edit" => {
                let (label, instruction) = rest.split_once(' ').unwrap_or((rest, ""));
                let Some(style) = OutfitStyle::from_label(label) else {
                    eprintln!("Unknown outfit '{}'", label);
                    continue;
                };
                println!("✏️  Editing {} outfit...", style);
                match stylist.edit_style(style, instruction).await {
                    Ok(outfit) => {
                        save_outfit(&gallery, &outfit);
                    }
                    Err(err) => report(&err),
                }
            }
            "prefer" | "colors" | "avoid" => {
                // The editor builds the whole next profile and saves it at once
                let mut next = stylist.profile();
                match command {
                    "prefer" => {
                        let parsed: Result<Vec<_>, _> = rest
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(parse_clothing_style)
                            .collect();
                        match parsed {
                            Ok(styles) => next.preferred_styles = styles.into_iter().collect(),
                            Err(e) => {
                                eprintln!("{}", e);
                                continue;
                            }
                        }
                    }
                    "colors" => next.favorite_colors = rest.to_string(),
                    _ => next.disliked = rest.to_string(),
                }
                stylist.save_profile(next);
                render_profile(&skin, &stylist.profile());
                println!("Saved. Applies to the next `regenerate` or `upload`.");
            }
            _ => eprintln!("Unknown command. Type `help`."),
        }
    }

    println!("Goodbye!");
    Ok(())
}
