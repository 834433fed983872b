use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use super::contains_ignore_case;
use crate::{
    date_filter::{filter_by_date, DateFilter},
    errors::ServiceError,
    models::{
        CreateOrderInput, FulfillmentStatus, Order, OrderItem, OrderItemInput, OrderKind,
        OrderPayment, PaymentInput, PaymentStatus, PaymentTiming, UpdateOrderItemsInput,
    },
    status,
    store::Repository,
};

/// Criteria for listing orders. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date: DateFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub count: usize,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub outstanding: Decimal,
    pub pending: usize,
    pub completed: usize,
    pub unpaid: usize,
    pub partially_paid: usize,
    pub fully_paid: usize,
}

/// Sales or purchases, depending on `kind`. Both ledgers behave identically.
#[derive(Clone)]
pub struct OrderService {
    kind: OrderKind,
    repository: Arc<dyn Repository<Order>>,
}

impl OrderService {
    pub fn new(kind: OrderKind, repository: Arc<dyn Repository<Order>>) -> Self {
        Self { kind, repository }
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Creates an order, taking the initial payment when `payment_timing` is `Now`.
    #[instrument(skip(self, input), fields(kind = %self.kind, order_number = %input.order_number))]
    pub fn create_order(
        &self,
        input: CreateOrderInput,
        today: NaiveDate,
    ) -> Result<Order, ServiceError> {
        input.validate()?;
        let items = build_items(&input.items)?;
        let order_number = input.order_number.trim().to_string();

        let now = Utc::now();
        let mut order = Order {
            id: 0,
            kind: self.kind,
            order_number: order_number.clone(),
            items,
            total_amount: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            payment_status: PaymentStatus::Unpaid,
            fulfillment_status: FulfillmentStatus::Pending,
            payment_timing: input.payment_timing,
            date: input.date.unwrap_or(today),
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        order.recalculate()?;

        match (input.payment_timing, input.payment) {
            (PaymentTiming::Now, Some(payment)) => {
                apply_payment(&mut order, payment, today).map_err(|e| {
                    warn!(error = %e, "initial payment rejected");
                    e
                })?;
            }
            (PaymentTiming::Now, None) => {
                return Err(ServiceError::InvalidInput(
                    "payment is required when paying now".to_string(),
                ));
            }
            (PaymentTiming::Later, Some(_)) => {
                return Err(ServiceError::InvalidInput(
                    "payment must be omitted when paying later".to_string(),
                ));
            }
            (PaymentTiming::Later, None) => {}
        }

        let order = self.repository.insert(order).map_err(|_| {
            warn!("duplicate order number");
            ServiceError::Conflict(format!("{} {} already exists", self.kind, order_number))
        })?;
        info!(
            order_id = order.id,
            total = %order.total_amount,
            payment_status = %order.payment_status,
            "order created"
        );
        Ok(order)
    }

    pub fn get_order(&self, id: u64) -> Result<Order, ServiceError> {
        self.repository
            .get(id)
            .ok_or_else(|| ServiceError::not_found(&self.kind.to_string(), id))
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    pub fn delete_order(&self, id: u64) -> Result<Order, ServiceError> {
        let removed = self
            .repository
            .remove(id)
            .ok_or_else(|| ServiceError::not_found(&self.kind.to_string(), id))?;
        info!(order_id = id, "order deleted");
        Ok(removed)
    }

    /// Replaces the order lines and recomputes every derived field.
    #[instrument(skip(self, input), fields(kind = %self.kind))]
    pub fn update_items(
        &self,
        id: u64,
        input: UpdateOrderItemsInput,
    ) -> Result<Order, ServiceError> {
        input.validate()?;
        let items = build_items(&input.items)?;

        let updated = self
            .repository
            .update(id, &mut |order: &mut Order| {
                order.items = items.clone();
                order.recalculate()?;
                if order.total_amount < order.amount_paid {
                    return Err(ServiceError::InvalidOperation(format!(
                        "new total {} is below the {} already paid",
                        order.total_amount, order.amount_paid
                    )));
                }
                order.updated_at = Utc::now();
                Ok(())
            })
            .map_err(|e| {
                warn!(order_id = id, error = %e, "line edit rejected");
                e
            })?
            .ok_or_else(|| ServiceError::not_found(&self.kind.to_string(), id))?;

        info!(
            order_id = id,
            total = %updated.total_amount,
            fulfillment_status = %updated.fulfillment_status,
            "order lines updated"
        );
        Ok(updated)
    }

    /// Adds carried quantity to the line at zero-based index `line`.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub fn record_fulfillment(
        &self,
        id: u64,
        line: usize,
        quantity: u32,
    ) -> Result<Order, ServiceError> {
        if quantity == 0 {
            return Err(ServiceError::ValidationError(
                "fulfilled quantity must be at least 1".to_string(),
            ));
        }

        let updated = self
            .repository
            .update(id, &mut |order: &mut Order| {
                let item = order.items.get_mut(line).ok_or_else(|| {
                    ServiceError::NotFound(format!("line {} not found on order {}", line, id))
                })?;
                let fulfilled = item
                    .quantity_fulfilled
                    .checked_add(quantity)
                    .filter(|total| *total <= item.quantity_ordered)
                    .ok_or_else(|| {
                        ServiceError::InvalidOperation(format!(
                            "cannot fulfil {} more of {}: only {} remaining",
                            quantity, item.product, item.quantity_remaining
                        ))
                    })?;
                item.quantity_fulfilled = fulfilled;
                order.recalculate()?;
                order.updated_at = Utc::now();
                Ok(())
            })
            .map_err(|e| {
                warn!(order_id = id, error = %e, "fulfillment rejected");
                e
            })?
            .ok_or_else(|| ServiceError::not_found(&self.kind.to_string(), id))?;

        info!(
            order_id = id,
            line,
            fulfillment_status = %updated.fulfillment_status,
            "fulfillment recorded"
        );
        Ok(updated)
    }

    #[instrument(skip(self, input), fields(kind = %self.kind, amount = %input.amount))]
    pub fn record_payment(
        &self,
        id: u64,
        input: PaymentInput,
        today: NaiveDate,
    ) -> Result<Order, ServiceError> {
        let updated = self
            .repository
            .update(id, &mut |order: &mut Order| {
                apply_payment(order, input.clone(), today)?;
                order.updated_at = Utc::now();
                Ok(())
            })
            .map_err(|e| {
                warn!(order_id = id, error = %e, "payment rejected");
                e
            })?
            .ok_or_else(|| ServiceError::not_found(&self.kind.to_string(), id))?;

        info!(
            order_id = id,
            amount_paid = %updated.amount_paid,
            payment_status = %updated.payment_status,
            "payment recorded"
        );
        Ok(updated)
    }

    pub fn list_orders(&self, filter: &OrderFilter, today: NaiveDate) -> Vec<Order> {
        let matching = self.repository.all().into_iter().filter(|order| {
            filter
                .search
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(&order.order_number, needle))
                && filter
                    .fulfillment_status
                    .map_or(true, |s| order.fulfillment_status == s)
                && filter
                    .payment_status
                    .map_or(true, |s| order.payment_status == s)
        });
        filter_by_date(matching, &filter.date, today)
    }

    pub fn summary(&self) -> OrderSummary {
        self.repository
            .all()
            .iter()
            .fold(OrderSummary::default(), |mut summary, order| {
                summary.count += 1;
                summary.total_amount = summary.total_amount.saturating_add(order.total_amount);
                summary.amount_paid = summary.amount_paid.saturating_add(order.amount_paid);
                summary.outstanding = summary.outstanding.saturating_add(order.outstanding_balance());
                match order.fulfillment_status {
                    FulfillmentStatus::Pending => summary.pending += 1,
                    FulfillmentStatus::Completed => summary.completed += 1,
                }
                match order.payment_status {
                    PaymentStatus::Unpaid => summary.unpaid += 1,
                    PaymentStatus::PartiallyPaid => summary.partially_paid += 1,
                    PaymentStatus::FullyPaid => summary.fully_paid += 1,
                }
                summary
            })
    }

    /// Orders that still have money owed on them.
    pub fn with_outstanding_balance(&self) -> Vec<Order> {
        self.repository
            .all()
            .into_iter()
            .filter(|order| order.outstanding_balance() > Decimal::ZERO)
            .collect()
    }
}

fn build_items(inputs: &[OrderItemInput]) -> Result<Vec<OrderItem>, ServiceError> {
    inputs
        .iter()
        .enumerate()
        .map(|(line, input)| {
            if input.quantity_ordered == 0 {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: quantity ordered must be at least 1",
                    line
                )));
            }
            if input.quantity_fulfilled > input.quantity_ordered {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: quantity fulfilled {} exceeds quantity ordered {}",
                    line, input.quantity_fulfilled, input.quantity_ordered
                )));
            }
            if input.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: unit price cannot be negative",
                    line
                )));
            }
            OrderItem::try_from(input)
        })
        .collect()
}

/// Checks the payment, appends it and refreshes the payment status.
fn apply_payment(
    order: &mut Order,
    input: PaymentInput,
    today: NaiveDate,
) -> Result<(), ServiceError> {
    input.validate()?;
    let reference = input
        .reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    if input.method.requires_reference() && reference.is_none() {
        return Err(ServiceError::ValidationError(format!(
            "{} payments require a reference",
            input.method
        )));
    }

    status::reconcile_payment(order.total_amount, order.amount_paid, input.amount)?;

    let payment_id = order.payments.last().map_or(1, |p| p.id + 1);
    order.payments.push(OrderPayment {
        id: payment_id,
        amount: input.amount,
        method: input.method,
        date: input.date.unwrap_or(today),
        reference,
    });
    order.recalculate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, ProductName};
    use crate::store::in_memory;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 26).unwrap()
    }

    fn service() -> OrderService {
        OrderService::new(OrderKind::Sale, in_memory())
    }

    fn line(product: ProductName, ordered: u32, fulfilled: u32, price: Decimal) -> OrderItemInput {
        OrderItemInput {
            product,
            quantity_ordered: ordered,
            quantity_fulfilled: fulfilled,
            unit_price: price,
        }
    }

    fn cash(amount: Decimal) -> PaymentInput {
        PaymentInput {
            amount,
            method: PaymentMethod::Cash,
            date: None,
            reference: None,
        }
    }

    fn later_order(number: &str, items: Vec<OrderItemInput>) -> CreateOrderInput {
        CreateOrderInput {
            order_number: number.to_string(),
            items,
            payment_timing: PaymentTiming::Later,
            date: None,
            payment: None,
        }
    }

    #[test]
    fn create_derives_totals_and_statuses() {
        let svc = service();
        let order = svc
            .create_order(
                CreateOrderInput {
                    order_number: "SO-1".into(),
                    items: vec![
                        line(ProductName::Super, 10, 10, dec!(1500)),
                        line(ProductName::Bran, 4, 1, dec!(250)),
                    ],
                    payment_timing: PaymentTiming::Now,
                    date: None,
                    payment: Some(cash(dec!(5000))),
                },
                today(),
            )
            .unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.total_amount, dec!(16000));
        assert_eq!(order.amount_paid, dec!(5000));
        assert_eq!(order.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(order.fulfillment_status, FulfillmentStatus::Pending);
        assert_eq!(order.items[1].quantity_remaining, 3);
        assert_eq!(order.date, today());
        assert_eq!(order.payments[0].date, today());
    }

    #[test]
    fn create_rejects_overfulfilled_line() {
        let err = service()
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 5, 6, dec!(10))]),
                today(),
            )
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[test]
    fn create_rejects_empty_items() {
        let err = service()
            .create_order(later_order("SO-1", vec![]), today())
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[test]
    fn create_rejects_duplicate_number_ignoring_case() {
        let svc = service();
        svc.create_order(
            later_order("so-7", vec![line(ProductName::Super, 1, 0, dec!(10))]),
            today(),
        )
        .unwrap();
        let err = svc
            .create_order(
                later_order("SO-7", vec![line(ProductName::Super, 1, 0, dec!(10))]),
                today(),
            )
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
    }

    #[test]
    fn paying_now_requires_a_payment() {
        let mut input = later_order("SO-1", vec![line(ProductName::Super, 1, 0, dec!(10))]);
        input.payment_timing = PaymentTiming::Now;
        let err = service().create_order(input, today()).unwrap_err();
        assert_matches!(err, ServiceError::InvalidInput(_));
    }

    #[test]
    fn paying_later_forbids_a_payment() {
        let mut input = later_order("SO-1", vec![line(ProductName::Super, 1, 0, dec!(10))]);
        input.payment = Some(cash(dec!(10)));
        let err = service().create_order(input, today()).unwrap_err();
        assert_matches!(err, ServiceError::InvalidInput(_));
    }

    #[test]
    fn overpayment_is_rejected_and_order_unchanged() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 1, 0, dec!(100))]),
                today(),
            )
            .unwrap();

        let err = svc
            .record_payment(order.id, cash(dec!(150)), today())
            .unwrap_err();
        assert_matches!(err, ServiceError::PaymentRejected(_));

        let stored = svc.get_order(order.id).unwrap();
        assert_eq!(stored.amount_paid, Decimal::ZERO);
        assert!(stored.payments.is_empty());
    }

    #[test]
    fn non_cash_payment_needs_reference() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 1, 0, dec!(100))]),
                today(),
            )
            .unwrap();
        let payment = PaymentInput {
            amount: dec!(50),
            method: PaymentMethod::MobileMoney,
            date: None,
            reference: Some("   ".into()),
        };
        let err = svc.record_payment(order.id, payment, today()).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[test]
    fn payments_accumulate_to_fully_paid() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Ordinaire, 2, 0, dec!(50))]),
                today(),
            )
            .unwrap();
        svc.record_payment(order.id, cash(dec!(40)), today()).unwrap();
        let paid = svc.record_payment(order.id, cash(dec!(60)), today()).unwrap();

        assert_eq!(paid.payment_status, PaymentStatus::FullyPaid);
        assert_eq!(paid.outstanding_balance(), Decimal::ZERO);
        assert_eq!(
            paid.payments.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn editing_lines_recomputes_with_creation_formulas() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 10, 5, dec!(10))]),
                today(),
            )
            .unwrap();
        assert_eq!(order.fulfillment_status, FulfillmentStatus::Pending);

        let edited = svc
            .update_items(
                order.id,
                UpdateOrderItemsInput {
                    items: vec![line(ProductName::Super, 5, 5, dec!(10))],
                },
            )
            .unwrap();
        assert_eq!(edited.items[0].quantity_remaining, 0);
        assert_eq!(edited.total_amount, dec!(50));
        assert_eq!(edited.fulfillment_status, FulfillmentStatus::Completed);
    }

    #[test]
    fn editing_below_amount_paid_is_rejected() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 10, 0, dec!(10))]),
                today(),
            )
            .unwrap();
        svc.record_payment(order.id, cash(dec!(80)), today()).unwrap();

        let err = svc
            .update_items(
                order.id,
                UpdateOrderItemsInput {
                    items: vec![line(ProductName::Super, 5, 0, dec!(10))],
                },
            )
            .unwrap_err();
        assert_matches!(err, ServiceError::InvalidOperation(_));
        assert_eq!(svc.get_order(order.id).unwrap().total_amount, dec!(100));
    }

    #[test]
    fn fulfillment_completes_order_and_cannot_overshoot() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Bran, 10, 4, dec!(1))]),
                today(),
            )
            .unwrap();

        let err = svc.record_fulfillment(order.id, 0, 7).unwrap_err();
        assert_matches!(err, ServiceError::InvalidOperation(_));

        let done = svc.record_fulfillment(order.id, 0, 6).unwrap();
        assert_eq!(done.fulfillment_status, FulfillmentStatus::Completed);

        assert_matches!(
            svc.record_fulfillment(order.id, 3, 1),
            Err(ServiceError::NotFound(_))
        );
    }

    #[test]
    fn list_filters_by_search_status_and_date() {
        let svc = service();
        let last_month = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let mut old = later_order("SO-OLD", vec![line(ProductName::Super, 1, 1, dec!(10))]);
        old.date = Some(last_month);
        svc.create_order(old, today()).unwrap();
        svc.create_order(
            later_order("SO-NEW", vec![line(ProductName::Super, 1, 0, dec!(10))]),
            today(),
        )
        .unwrap();

        let this_month = OrderFilter {
            date: DateFilter::Month,
            ..Default::default()
        };
        let listed = svc.list_orders(&this_month, today());
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order_number, "SO-NEW");

        let completed = OrderFilter {
            fulfillment_status: Some(FulfillmentStatus::Completed),
            ..Default::default()
        };
        assert_eq!(svc.list_orders(&completed, today())[0].order_number, "SO-OLD");

        let search = OrderFilter {
            search: Some("new".into()),
            ..Default::default()
        };
        assert_eq!(svc.list_orders(&search, today()).len(), 1);
    }

    #[test]
    fn summary_counts_statuses_and_money() {
        let svc = service();
        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 2, 2, dec!(100))]),
                today(),
            )
            .unwrap();
        svc.record_payment(order.id, cash(dec!(50)), today()).unwrap();
        svc.create_order(
            later_order("SO-2", vec![line(ProductName::Bran, 1, 0, dec!(30))]),
            today(),
        )
        .unwrap();

        let summary = svc.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_amount, dec!(230));
        assert_eq!(summary.amount_paid, dec!(50));
        assert_eq!(summary.outstanding, dec!(180));
        assert_eq!((summary.pending, summary.completed), (1, 1));
        assert_eq!(
            (summary.unpaid, summary.partially_paid, summary.fully_paid),
            (1, 1, 0)
        );
        assert_eq!(svc.with_outstanding_balance().len(), 2);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let svc = service();
        let first = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 1, 0, dec!(1))]),
                today(),
            )
            .unwrap();
        svc.delete_order(first.id).unwrap();
        let second = svc
            .create_order(
                later_order("SO-2", vec![line(ProductName::Super, 1, 0, dec!(1))]),
                today(),
            )
            .unwrap();
        assert_eq!(second.id, 2);
        assert_matches!(svc.get_order(first.id), Err(ServiceError::NotFound(_)));
    }

    #[test]
    fn oversized_amounts_are_rejected_instead_of_overflowing() {
        let svc = service();
        assert_matches!(
            svc.create_order(
                later_order("SO-BIG", vec![line(ProductName::Super, u32::MAX, 0, Decimal::MAX)]),
                today(),
            ),
            Err(ServiceError::ValidationError(_))
        );

        let two_huge_lines = vec![
            line(ProductName::Super, 1, 0, Decimal::MAX),
            line(ProductName::Bran, 1, 0, Decimal::MAX),
        ];
        assert_matches!(
            svc.create_order(later_order("SO-BIG", two_huge_lines.clone()), today()),
            Err(ServiceError::ValidationError(_))
        );

        let order = svc
            .create_order(
                later_order("SO-1", vec![line(ProductName::Super, 1, 0, dec!(10))]),
                today(),
            )
            .unwrap();
        assert_matches!(
            svc.update_items(order.id, UpdateOrderItemsInput { items: two_huge_lines }),
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(svc.get_order(order.id).unwrap().total_amount, dec!(10));
    }

    #[test]
    fn blank_order_number_is_rejected() {
        assert_matches!(
            service().create_order(
                later_order("   ", vec![line(ProductName::Super, 1, 0, dec!(10))]),
                today(),
            ),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn concurrent_creates_store_each_number_once() {
        use std::sync::Barrier;
        use std::thread;

        const THREADS: usize = 8;
        let svc = Arc::new(service());

        for round in 0..50 {
            let barrier = Arc::new(Barrier::new(THREADS));
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let svc = Arc::clone(&svc);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        svc.create_order(
                            later_order(
                                &format!("SO-{round}"),
                                vec![line(ProductName::Super, 1, 0, dec!(10))],
                            ),
                            today(),
                        )
                    })
                })
                .collect();

            let results: Vec<_> = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect();
            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "round {round}");
            assert!(results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, ServiceError::Conflict(_))));
        }

        let filter = OrderFilter::default();
        assert_eq!(svc.list_orders(&filter, today()).len(), 50);
    }
}
