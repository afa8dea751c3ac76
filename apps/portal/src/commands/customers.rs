use torque_api::CustomerDirectory;
use torque_core::forms::CustomerForm;
use torque_core::table::CustomerRow;
use torque_core::types::{Customer, Membership};

use super::{print_json, show_table, Context};
use crate::error::PortalResult;
use crate::render::render_pairs;
use crate::{CustomerAction, CustomerArgs};

pub async fn run(ctx: &Context, action: CustomerAction) -> PortalResult<()> {
    let directory = CustomerDirectory::new(ctx.transport());
    match action {
        CustomerAction::List(args) => {
            show_table(ctx, &args, directory.list(), |customer| CustomerRow::from(customer)).await
        }
        CustomerAction::Show { customer_id } => show(ctx, &directory.get(&customer_id).await?),
        CustomerAction::Add(fields) => {
            let customer = directory.create(&customer_form(fields)).await?;
            println!("Customer {} created", customer.customer_id);
            show(ctx, &customer)
        }
        CustomerAction::Edit { customer_id, fields } => {
            let customer = directory.update(&customer_id, &customer_form(fields)).await?;
            println!("Customer {} updated", customer.customer_id);
            show(ctx, &customer)
        }
    }
}

fn customer_form(fields: CustomerArgs) -> CustomerForm {
    CustomerForm {
        name: fields.name,
        email: fields.email,
        phone: fields.phone,
        street: fields.street,
        city: fields.city,
        state: fields.state,
        postal_code: fields.postal_code,
        membership: Membership::from_label(&fields.membership),
    }
}

fn show(ctx: &Context, customer: &Customer) -> PortalResult<()> {
    if ctx.json {
        return print_json(customer);
    }
    let pairs = [
        ("Id", customer.customer_id.clone()),
        ("Name", customer.name.clone()),
        ("Email", customer.email.clone()),
        ("Phone", customer.phone.clone()),
        ("Address", customer.address_line()),
        ("Membership", customer.membership.to_string()),
    ];
    println!("{}", render_pairs("Customer", &pairs));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_label_is_parsed() {
        let form = customer_form(CustomerArgs {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            street: String::new(),
            city: "Pune".to_string(),
            state: String::new(),
            postal_code: String::new(),
            membership: "premium-gold".to_string(),
        });
        assert_eq!(form.membership, Membership::Premium);
        assert_eq!(form.city, "Pune");
    }
}
