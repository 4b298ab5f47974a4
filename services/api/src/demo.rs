use crate::infra::{parse_date, Dormitory};
use crate::server::seed_rooms;
use chrono::{Local, NaiveDate};
use clap::Args;
use dormkeep::billing::{format_period, NotificationStatus};
use dormkeep::billing::period::{first_of_month, last_of_month};
use dormkeep::domain::money::format_currency;
use dormkeep::domain::{
    DepositStatus, NewContact, NewPayment, NewRoom, NewTenant, PaymentMethod, RoomId,
    TenantDetails, TenantId,
};
use dormkeep::error::AppError;
use dormkeep::reporting::DashboardSummary;
use dormkeep::tenancy::{RoomAssignment, RoomPlacement};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the dashboard (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the payment history of the first tenant as CSV.
    #[arg(long)]
    pub(crate) export_history: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Room roster CSV with Room Number, Capacity, Monthly Rate, and Status columns
    #[arg(long)]
    pub(crate) roster_csv: PathBuf,
    /// Reporting date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        roster_csv,
        today,
        json,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let dormitory = Dormitory::in_memory();
    seed_rooms(&dormitory, &roster_csv)?;

    let summary = dormitory.dashboard.summary(today)?;
    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Dashboard payload unavailable: {err}"),
        }
    } else {
        render_summary(&summary);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        export_history,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let dormitory = Dormitory::in_memory();

    println!("Dormitory demo ({})", today.format("%b %d, %Y"));

    let room_a = demo_room(&dormitory, "A", 2, 3500)?;
    let room_b = demo_room(&dormitory, "B", 1, 4800)?;
    println!("- Rooms A (2 slots) and B (1 slot) registered");

    let guardian = dormitory.registry.create_guardian(NewContact {
        name: "Rosa Reyes".to_string(),
        relationship: Some("Mother".to_string()),
        contact_number: "0917 555 0199".to_string(),
        email: None,
        address: Some("Iloilo City".to_string()),
    })?;

    let liza = demo_tenant(&dormitory, "Liza", "Reyes", Some(room_a))?;
    dormitory.lifecycle.link_guardian(liza, Some(guardian.id))?;
    let mark = demo_tenant(&dormitory, "Mark", "Tan", Some(room_a))?;
    let nina = demo_tenant(&dormitory, "Nina", "Uy", Some(room_a))?;

    println!("\nRoom A after three placement requests");
    let occupancy = dormitory.lifecycle.ledger().query_occupancy(room_a)?;
    println!(
        "- {} of {} slots used ({})",
        occupancy.occupied(),
        occupancy.capacity,
        occupancy.status.label()
    );

    dormitory.lifecycle.deactivate(mark)?;
    println!("- Mark Tan moved out; slot returned to Room A");
    match dormitory.lifecycle.assign_room(nina, Some(room_a)) {
        Ok(RoomAssignment::Assigned { to }) => println!(
            "- Nina Uy placed in Room A ({} slot(s) left)",
            to.slots_available
        ),
        Ok(other) => println!("- Nina Uy assignment: {other:?}"),
        Err(err) => println!("- Nina Uy still waiting: {err}"),
    }

    let dana = demo_tenant(&dormitory, "Dana", "Lim", Some(room_b))?;

    println!("\nPayments");
    let month_start = first_of_month(today);
    let month_end = last_of_month(today);
    demo_payment(
        &dormitory,
        liza,
        today,
        (month_start, month_end),
        PaymentMethod::Gcash,
        "GC-0001",
    )?;
    let previous_end = month_start.pred_opt().unwrap_or(month_start);
    demo_payment(
        &dormitory,
        dana,
        previous_end,
        (first_of_month(previous_end), previous_end),
        PaymentMethod::Cash,
        "OR-1042",
    )?;

    for tenant in [liza, nina, dana] {
        let due = dormitory.billing.is_rent_due(tenant, today)?;
        let name = dormitory.lifecycle.tenant(tenant)?.full_name();
        println!(
            "- {name}: {}",
            if due { "rent due" } else { "paid for the month" }
        );
    }

    println!("\nTenants");
    for row in dormitory.dashboard.tenant_rows()? {
        println!(
            "- {} | room {} | guardian {} | deposit {} | lease {}",
            row.name,
            row.room,
            if row.guardian.is_empty() { "-" } else { row.guardian.as_str() },
            row.deposit,
            row.lease
        );
    }

    println!();
    render_summary(&dormitory.dashboard.summary(today)?);

    if export_history {
        println!("\nPayment history for Liza Reyes");
        dormitory
            .billing
            .export_history_csv(liza, std::io::stdout())?;
    }

    Ok(())
}

fn demo_room(
    dormitory: &Dormitory,
    number: &str,
    capacity: u32,
    rate: i64,
) -> Result<RoomId, AppError> {
    let room = dormitory.registry.create_room(NewRoom {
        room_number: number.to_string(),
        capacity,
        monthly_rate: Decimal::from(rate),
        under_maintenance: false,
    })?;
    Ok(room.id)
}

fn demo_tenant(
    dormitory: &Dormitory,
    first: &str,
    last: &str,
    room_id: Option<RoomId>,
) -> Result<TenantId, AppError> {
    let creation = dormitory.lifecycle.create_tenant(NewTenant {
        details: TenantDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            contact_number: None,
            lease_start_date: None,
            lease_end_date: None,
            security_deposit_amount: Decimal::from(3500),
            deposit_status: DepositStatus::Paid,
        },
        room_id,
        guardian_id: None,
        emergency_contact_id: None,
        user_id: None,
    })?;

    if let RoomPlacement::Rejected { room_id, reason } = &creation.placement {
        println!(
            "- {} registered without a room: {room_id} refused ({reason})",
            creation.tenant.full_name()
        );
    }
    Ok(creation.tenant.id)
}

fn demo_payment(
    dormitory: &Dormitory,
    tenant_id: TenantId,
    paid_on: NaiveDate,
    covered: (NaiveDate, NaiveDate),
    method: PaymentMethod,
    reference: &str,
) -> Result<(), AppError> {
    let recorded = dormitory.billing.record_payment(NewPayment {
        tenant_id,
        user_id: None,
        payment_date: paid_on,
        amount: Decimal::from(3500),
        method,
        period_covered_start: covered.0,
        period_covered_end: covered.1,
        receipt_reference: Some(reference.to_string()),
        qr_payload: None,
        notes: None,
    })?;

    let payment = &recorded.payment;
    println!(
        "- {} via {} for {}{}",
        format_currency(payment.amount),
        payment.method.label(),
        format_period(payment.period_covered_start, payment.period_covered_end),
        match &recorded.notification {
            NotificationStatus::Delivered => String::new(),
            NotificationStatus::Failed(reason) => format!(" (receipt not sent: {reason})"),
        }
    );
    Ok(())
}

fn render_summary(summary: &DashboardSummary) {
    println!("Dashboard as of {}", summary.as_of.format("%b %d, %Y"));
    println!("- Active tenants: {}", summary.active_tenants);
    println!(
        "- Occupancy: {} ({} of {} active rooms)",
        summary.occupancy_rate.label(),
        summary.occupied_rooms,
        summary.active_rooms
    );
    println!("- Revenue this month: {}", summary.monthly_revenue_label);
    if summary.overdue.is_empty() {
        println!("- Overdue: none");
        return;
    }
    println!("- Overdue:");
    for entry in &summary.overdue {
        let last_paid = entry
            .last_payment_date
            .map(|date| date.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "    - {} (room {}) last paid {}",
            entry.tenant_name,
            entry.room_number.as_deref().unwrap_or("-"),
            last_paid
        );
    }
}
