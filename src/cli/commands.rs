use crate::cli::{
    context::{CommandError, CommandResult, ShellContext},
    output,
    registry::{CommandEntry, CommandRegistry},
    table::Table,
};
use crate::ledger::{parse_quantity, DuplicatePolicy, StockLevel};

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(CommandEntry::new(
        "list",
        "Show the stock table sorted by brand and flavour",
        "list",
        cmd_list,
    ));
    registry.register(CommandEntry::new(
        "add",
        "Add a product",
        "add <brand> <flavour> <quantity>",
        cmd_add,
    ));
    registry.register(CommandEntry::new(
        "remove",
        "Remove the product shown on a table row",
        "remove <row>",
        cmd_remove,
    ));
    registry.register(CommandEntry::new(
        "set",
        "Set the estimated quantity of a table row",
        "set <row> <quantity>",
        cmd_set,
    ));
    registry.register(CommandEntry::new(
        "stock",
        "Show remaining stock for a brand and flavour",
        "stock <brand> <flavour>",
        cmd_stock,
    ));
    registry.register(CommandEntry::new(
        "total",
        "Show total stock across all products",
        "total",
        cmd_total,
    ));
    registry.register(CommandEntry::new(
        "low",
        "List products that are running out",
        "low",
        cmd_low,
    ));
    registry.register(CommandEntry::new(
        "policy",
        "Show or change how duplicate products are added",
        "policy [allow|merge|reject]",
        cmd_policy,
    ));
    registry.register(CommandEntry::new(
        "help",
        "List commands",
        "help [command]",
        cmd_help,
    ));
    registry.register(CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit));

    registry.alias("ls", "list");
    registry.alias("rm", "remove");
    registry.alias("quit", "exit");
}

fn expect_args(ctx: &ShellContext, name: &str, args: &[&str], count: usize) -> CommandResult {
    if args.len() == count {
        return Ok(());
    }
    let usage = ctx.registry.get(name).map(|entry| entry.usage).unwrap_or(name);
    Err(CommandError::InvalidArguments(format!("usage: {}", usage)))
}

fn cmd_list(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "list", args, 0)?;
    ctx.refresh_view();
    let sorted = ctx.manager.sorted();
    if sorted.is_empty() {
        output::info("No products in stock.");
        return Ok(());
    }
    println!("{}", Table::stock(&sorted).render());
    output::info(format!(
        "{} products, last change {}",
        sorted.len(),
        ctx.manager
            .ledger()
            .updated_at()
            .format("%Y-%m-%d %H:%M UTC")
    ));
    Ok(())
}

fn cmd_add(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "add", args, 3)?;
    let quantity = parse_quantity(args[2])
        .map_err(|_| invalid("Estimated Quantity must be a non-negative integer."))?;
    let id = ctx.manager.add_product(args[0], args[1], quantity)?;
    // Under `merge` the id is the existing record, so this is the new total.
    if let Some(record) = ctx.manager.ledger().get(id) {
        output::success(format!(
            "Added {} - {} ({} in stock)",
            record.brand, record.flavour, record.quantity
        ));
    }
    Ok(())
}

fn cmd_remove(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "remove", args, 1)?;
    let id = ctx.record_for_row(args[0])?;
    let label = match ctx.manager.ledger().get(id) {
        Some(record) => format!("{} - {}", record.brand, record.flavour),
        None => return Err(invalid("That row no longer exists; run `list` again.")),
    };
    if !ctx.confirm(&format!("Are you sure you want to remove {}?", label))? {
        output::info("Nothing removed.");
        return Ok(());
    }
    ctx.manager.remove_product(id)?;
    output::success(format!("Removed {}", label));
    Ok(())
}

fn cmd_set(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "set", args, 2)?;
    let id = ctx.record_for_row(args[0])?;
    let quantity = parse_quantity(args[1])
        .map_err(|_| invalid("Estimated Quantity must be a non-negative integer."))?;
    ctx.manager.update_quantity(id, quantity)?;
    if let Some(record) = ctx.manager.ledger().get(id) {
        output::success(format!(
            "{} - {} set to {} ({})",
            record.brand,
            record.flavour,
            quantity,
            StockLevel::classify(quantity)
        ));
    }
    Ok(())
}

fn cmd_stock(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "stock", args, 2)?;
    let (brand, flavour) = (args[0], args[1]);
    match ctx.manager.remaining_stock(brand, flavour) {
        Some(quantity) => output::info(format!(
            "Remaining stock for {} - {}: {}",
            brand, flavour, quantity
        )),
        None => output::warning(format!(
            "{} - {} is not found in the current stock.",
            brand, flavour
        )),
    }
    Ok(())
}

fn cmd_total(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "total", args, 0)?;
    output::info(format!(
        "Total stock quantity for all products: {}",
        ctx.manager.total_stock()
    ));
    Ok(())
}

fn cmd_low(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(ctx, "low", args, 0)?;
    let low = ctx.manager.ledger().with_level(StockLevel::Low);
    if low.is_empty() {
        output::success("Nothing is running low.");
        return Ok(());
    }
    output::section("Running low");
    for record in low {
        println!(
            "  {} - {}: {}",
            record.brand,
            record.flavour,
            output::level_cell(record.quantity)
        );
    }
    Ok(())
}

fn cmd_policy(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            output::info(format!(
                "Duplicate policy: {}",
                ctx.manager.ledger().policy().as_str()
            ));
            Ok(())
        }
        [raw] => {
            let policy = DuplicatePolicy::parse(raw)
                .ok_or_else(|| invalid("policy must be one of allow, merge, reject"))?;
            let mut config = ctx.config.clone();
            config.duplicate_policy = policy;
            ctx.config_manager.save(&config)?;
            ctx.config = config;
            ctx.manager.set_policy(policy);
            output::success(format!("Duplicate policy set to {}", policy.as_str()));
            Ok(())
        }
        _ => expect_args(ctx, "policy", args, 1),
    }
}

fn cmd_help(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let entry = ctx
            .registry
            .get(&name.to_lowercase())
            .ok_or_else(|| invalid(&format!("no command named `{}`", name)))?;
        println!("{}\n  {}", entry.usage, entry.description);
        return Ok(());
    }
    output::section("Commands");
    for entry in ctx.registry.list() {
        println!("  {:<30} {}", entry.usage, entry.description);
    }
    Ok(())
}

fn cmd_exit(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn invalid(message: &str) -> CommandError {
    CommandError::InvalidArguments(message.to_string())
}
