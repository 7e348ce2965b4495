//! Order commands — `scanstation order submit` and `scanstation order new`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::{Path, PathBuf};
use tracing::warn;

use scanstation::client::{HttpStationClient, StationApi};
use scanstation::order::{
    DraftFile, ItemKind, OrderDraft, PhotoAttachment, SubmitGuard, SubmitOutcome,
    UNIQUE_MATTRESS, parse_delivery_date, submit_order,
};
use scanstation::protocol::CatalogKind;
use scanstation::station_config::StationConfig;
use scanstation::ui::RequestSpinner;
use scanstation::ui::icons::{CHECK, CROSS, PACKAGE};

fn print_draft(draft: &OrderDraft) {
    let header = &draft.header;
    println!();
    println!("{}{}", PACKAGE, style("Заявка").bold());
    println!("  Организация: {}", header.organization);
    println!("  Контакт: {}", header.contact);
    println!("  Доставка: {}", header.delivery_type);
    if draft.address_visible() {
        println!("  Адрес: {}", header.delivery_address);
    }
    if draft.region_visible() {
        println!("  Регион: {}", header.region);
    }
    println!("  Дата: {}", header.delivery_date.format("%Y-%m-%d"));
    println!("  Предоплата: {}", header.prepayment);
    if draft.unique_size_visible() {
        println!("  Размер уникального матраса: {}", draft.unique_size);
    }
    println!();
    for item in draft.items() {
        let photo = match &item.kind {
            ItemKind::Mattress(options) if options.photo.is_some() => " [фото]",
            _ => "",
        };
        println!(
            "  #{} {} × {} по {}{}",
            item.id, item.name, item.quantity, item.price, photo
        );
    }
    println!();
}

fn report(outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Accepted(message) => println!("{}{}", CHECK, style(message).green()),
        SubmitOutcome::Rejected(message) => {
            println!("{}{}", CROSS, style("Что-то пошло не так. Пожалуйста, попробуйте еще раз.").red());
            if !message.is_empty() {
                println!("  {}", message);
            }
        }
        SubmitOutcome::Failed(message) => {
            println!("{}{}", CROSS, style("Ошибка при отправке формы.").red());
            println!("  {}", message);
        }
    }
}

async fn send(api: &dyn StationApi, guard: &mut SubmitGuard, draft: &mut OrderDraft) -> Result<SubmitOutcome> {
    let spinner = RequestSpinner::start(guard.label());
    let outcome = submit_order(api, guard, draft).await;
    spinner.clear();
    let outcome = outcome?;
    report(&outcome);
    Ok(outcome)
}

pub async fn cmd_order_submit(config: &StationConfig, path: &Path, yes: bool, dry_run: bool) -> Result<()> {
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut draft = DraftFile::load(path)?.into_draft(&base_dir, config.order().max_photo_bytes)?;

    if dry_run {
        let payload = draft.to_payload()?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_draft(&draft);
    if !yes {
        let confirm = Confirm::new()
            .with_prompt("Создать реализацию?")
            .default(true)
            .interact()
            .unwrap_or(false);
        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let client = HttpStationClient::new(config.server())?;
    let mut guard = SubmitGuard::new();
    let outcome = send(&client, &mut guard, &mut draft).await?;
    if !outcome.is_accepted() {
        anyhow::bail!("Order was not accepted");
    }
    Ok(())
}

/// Catalog entries, or an empty list when the server cannot provide them.
async fn load_catalog(api: &dyn StationApi, kind: CatalogKind) -> Vec<String> {
    match api.catalog(kind).await {
        Ok(items) => items,
        Err(e) => {
            warn!(catalog = %kind, error = %e, "catalog unavailable, falling back to free text");
            Vec::new()
        }
    }
}

/// Pick a value from `options` after narrowing by a typed filter. Free text
/// is accepted when nothing matches.
fn pick(theme: &ColorfulTheme, prompt: &str, options: &[String]) -> Result<String> {
    let filter: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    if options.is_empty() {
        return Ok(filter);
    }

    let needle = filter.to_lowercase();
    let matches: Vec<String> = options
        .iter()
        .filter(|o| o.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    if matches.is_empty() {
        return Ok(filter);
    }

    let selection = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&matches[..])
        .default(0)
        .interact()?;
    Ok(matches[selection].clone())
}

fn choose_item(theme: &ColorfulTheme, draft: &OrderDraft, prompt: &str) -> Result<u32> {
    let labels: Vec<String> = draft
        .items()
        .iter()
        .map(|item| format!("#{} {} × {}", item.id, item.name, item.quantity))
        .collect();
    let selection = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&labels[..])
        .default(0)
        .interact()?;
    Ok(draft.items()[selection].id)
}

fn input_price(theme: &ColorfulTheme) -> Result<f64> {
    let price: f64 = Input::with_theme(theme)
        .with_prompt("Цена")
        .default(0.0)
        .interact_text()?;
    Ok(price)
}

struct Catalogs {
    mattresses: Vec<String>,
    nomenclatures: Vec<String>,
    fabrics: Vec<String>,
    springs: Vec<String>,
}

fn edit_header(theme: &ColorfulTheme, config: &StationConfig, draft: &mut OrderDraft) -> Result<()> {
    let header = &mut draft.header;
    header.organization = Input::with_theme(theme)
        .with_prompt("Организация")
        .allow_empty(true)
        .interact_text()?;
    header.contact = Input::with_theme(theme)
        .with_prompt("Контакт")
        .allow_empty(true)
        .interact_text()?;

    let types = &config.order().delivery_types;
    if !types.is_empty() {
        let selection = Select::with_theme(theme)
            .with_prompt("Тип доставки")
            .items(&types[..])
            .default(0)
            .interact()?;
        header.delivery_type = types[selection].clone();
    }

    if draft.address_visible() {
        draft.header.delivery_address = Input::with_theme(theme)
            .with_prompt("Адрес доставки")
            .allow_empty(true)
            .interact_text()?;
    }
    if draft.region_visible() {
        draft.header.region = pick(theme, "Регион", &config.order().regions)?;
    }

    let today = draft.header.delivery_date.format("%Y-%m-%d").to_string();
    let date: String = Input::with_theme(theme)
        .with_prompt("Дата доставки")
        .default(today)
        .validate_with(|value: &String| parse_delivery_date(value).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()?;
    draft.header.delivery_date = parse_delivery_date(&date)?;

    draft.header.prepayment = Input::with_theme(theme)
        .with_prompt("Предоплата")
        .default(0.0)
        .interact_text()?;
    Ok(())
}

fn add_mattress(
    theme: &ColorfulTheme,
    config: &StationConfig,
    catalogs: &Catalogs,
    draft: &mut OrderDraft,
) -> Result<()> {
    let name = pick(theme, "Матрас", &catalogs.mattresses)?;
    if name.is_empty() {
        return Ok(());
    }
    let id = draft.add_mattress(&name);
    draft.set_price(id, input_price(theme)?)?;

    if name == UNIQUE_MATTRESS && draft.unique_size.is_empty() {
        draft.unique_size = Input::with_theme(theme)
            .with_prompt("Размер уникального матраса")
            .interact_text()?;
    }

    let photo_path: String = Input::with_theme(theme)
        .with_prompt("Фото (путь к файлу, пусто — без фото)")
        .allow_empty(true)
        .interact_text()?;

    {
        let options = draft.mattress_mut(id)?;
        if name != UNIQUE_MATTRESS {
            options.size = Input::with_theme(theme)
                .with_prompt("Размер")
                .allow_empty(true)
                .interact_text()?;
        }
        options.top_fabric = pick(theme, "Ткань верха", &catalogs.fabrics)?;
        options.side_fabric = pick(theme, "Ткань бока", &catalogs.fabrics)?;
        options.spring_block = pick(theme, "Пружинный блок", &catalogs.springs)?;
        options.comment = Input::with_theme(theme)
            .with_prompt("Комментарий")
            .allow_empty(true)
            .interact_text()?;
    }

    if !photo_path.trim().is_empty() {
        let path = PathBuf::from(photo_path.trim());
        let max = config.order().max_photo_bytes;
        if let Err(e) = draft.attach_photo(id, || PhotoAttachment::from_path(&path, max)) {
            println!("{}{}", CROSS, style(e.to_string()).red());
        }
    }
    Ok(())
}

fn add_additional(theme: &ColorfulTheme, catalogs: &Catalogs, draft: &mut OrderDraft) -> Result<()> {
    let name = pick(theme, "Позиция", &catalogs.nomenclatures)?;
    if name.is_empty() {
        return Ok(());
    }
    let id = draft.add_additional(&name);
    draft.set_price(id, input_price(theme)?)?;
    Ok(())
}

fn adjust_quantity(theme: &ColorfulTheme, draft: &mut OrderDraft) -> Result<()> {
    let id = choose_item(theme, draft, "Позиция")?;
    let actions = ["+1", "-1", "Задать количество"];
    let selection = Select::with_theme(theme)
        .items(&actions[..])
        .default(0)
        .interact()?;
    match selection {
        0 => {
            draft.increment(id)?;
        }
        1 => {
            if draft.decrement(id)?.is_none() {
                println!("Позиция #{} удалена", id);
            }
        }
        _ => {
            let quantity: u32 = Input::with_theme(theme)
                .with_prompt("Количество")
                .interact_text()?;
            draft.set_quantity(id, quantity)?;
        }
    }
    Ok(())
}

pub async fn cmd_order_new(config: &StationConfig) -> Result<()> {
    let client = HttpStationClient::new(config.server())?;
    let theme = ColorfulTheme::default();

    let spinner = RequestSpinner::start("Загрузка справочников");
    let catalogs = Catalogs {
        mattresses: load_catalog(&client, CatalogKind::Mattresses).await,
        nomenclatures: load_catalog(&client, CatalogKind::Nomenclatures).await,
        fabrics: load_catalog(&client, CatalogKind::Fabrics).await,
        springs: load_catalog(&client, CatalogKind::Springs).await,
    };
    spinner.clear();

    let mut draft = OrderDraft::new();
    let mut guard = SubmitGuard::new();
    edit_header(&theme, config, &mut draft).context("Failed to read order header")?;

    loop {
        let mut actions = vec!["Добавить матрас", "Добавить доп. позицию"];
        if !draft.is_empty() {
            actions.extend(["Изменить количество", "Удалить позицию"]);
        }
        if draft.can_submit() {
            actions.push(guard.label());
        }
        actions.push("Отмена");

        let selection = Select::with_theme(&theme)
            .with_prompt("Действие")
            .items(&actions[..])
            .default(0)
            .interact()?;

        match actions[selection] {
            "Добавить матрас" => add_mattress(&theme, config, &catalogs, &mut draft)?,
            "Добавить доп. позицию" => add_additional(&theme, &catalogs, &mut draft)?,
            "Изменить количество" => adjust_quantity(&theme, &mut draft)?,
            "Удалить позицию" => {
                let id = choose_item(&theme, &draft, "Удалить")?;
                draft.remove(id)?;
            }
            "Отмена" => {
                println!("Cancelled.");
                return Ok(());
            }
            _ => {
                print_draft(&draft);
                let confirm = Confirm::with_theme(&theme)
                    .with_prompt("Создать реализацию?")
                    .default(true)
                    .interact()?;
                if confirm && send(&client, &mut guard, &mut draft).await?.is_accepted() {
                    return Ok(());
                }
            }
        }
    }
}
