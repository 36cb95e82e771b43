use comfy_table::{presets::UTF8_FULL, Table};
use palpite_core::{NumberGenerator, Result, ServiceConfig};

/// Draws sets locally. Nothing is stored.
pub fn handle_generate_command(config: &ServiceConfig, premium: bool, count: usize) -> Result<()> {
    let generator = NumberGenerator::new(config.premium_policy.clone())?;
    let mut rng = rand::rng();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Policy", "Numbers"]);

    for i in 1..=count {
        let (policy, set) = if premium {
            ("premium", generator.generate_premium(&mut rng))
        } else {
            ("free", generator.generate_free(&mut rng))
        };
        table.add_row(vec![i.to_string(), policy.to_string(), set.to_string()]);
    }

    println!("{}", table);

    if premium {
        println!();
        println!("Bands:");
        for band in &generator.policy().bands {
            println!(
                "  {}: {}-{} (at least {})",
                band.name, band.low, band.high, band.count
            );
        }
    }

    Ok(())
}
